//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a fieldseal command running in the test directory.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("fieldseal").expect("failed to find fieldseal binary");
        cmd.current_dir(self.dir.path());
        cmd.env_remove("FIELDSEAL_CONFIG");
        cmd.env_remove("FIELDSEAL_LOG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Shortcut for `fieldseal check`.
    pub fn check(&self) -> Output {
        self.cmd()
            .arg("check")
            .output()
            .expect("failed to run fieldseal check")
    }

    /// Shortcut for `fieldseal demo`.
    pub fn demo(&self) -> Output {
        self.cmd()
            .arg("demo")
            .output()
            .expect("failed to run fieldseal demo")
    }

    /// Shortcut for `fieldseal keygen <kind>`.
    pub fn keygen(&self, kind: &str) -> Output {
        self.cmd()
            .args(["keygen", kind])
            .output()
            .expect("failed to run fieldseal keygen")
    }
}
