//! Mock encryption services.

use std::sync::Mutex;

use async_trait::async_trait;
use fieldseal::error::CipherError;
use fieldseal::EncryptionService;

/// Prefix of every value sealed by [`MockCipher`].
pub const MOCK_PREFIX: &str = "mock:";

/// Reversible hex "encryption" bound to the document key.
///
/// Sealed values look like `mock:<key>:<hex>`, with `-` standing in for no
/// key. Decrypting with a different key fails.
pub struct MockCipher;

impl MockCipher {
    pub fn seal(plaintext: &str, key: Option<&str>) -> String {
        let hex: String = plaintext.bytes().map(|b| format!("{:02x}", b)).collect();
        format!("{}{}:{}", MOCK_PREFIX, key.unwrap_or("-"), hex)
    }

    pub fn open(ciphertext: &str, key: Option<&str>) -> Option<String> {
        let body = ciphertext.strip_prefix(MOCK_PREFIX)?;
        let (sealed_key, hex) = body.rsplit_once(':')?;
        if sealed_key != key.unwrap_or("-") || hex.len() % 2 != 0 {
            return None;
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl EncryptionService for MockCipher {
    async fn encrypt(&self, plaintext: &str, key: Option<&str>) -> Result<String, CipherError> {
        Ok(Self::seal(plaintext, key))
    }

    async fn try_decrypt(&self, ciphertext: &str, key: Option<&str>) -> Option<String> {
        Self::open(ciphertext, key)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Backend that is down: every encrypt fails.
pub struct FailingService;

#[async_trait]
impl EncryptionService for FailingService {
    async fn encrypt(&self, _plaintext: &str, _key: Option<&str>) -> Result<String, CipherError> {
        Err(CipherError::Backend("backend unavailable".to_string()))
    }

    async fn try_decrypt(&self, _ciphertext: &str, _key: Option<&str>) -> Option<String> {
        None
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// [`MockCipher`] that records the key of every call.
#[derive(Default)]
pub struct RecordingService {
    keys: Mutex<Vec<Option<String>>>,
    dropped: Mutex<Vec<String>>,
}

impl RecordingService {
    /// Keys passed to `encrypt` and `try_decrypt`, in call order.
    pub fn keys(&self) -> Vec<Option<String>> {
        self.keys.lock().unwrap().clone()
    }

    pub fn dropped(&self) -> Vec<String> {
        self.dropped.lock().unwrap().clone()
    }

    fn record(&self, key: Option<&str>) {
        self.keys.lock().unwrap().push(key.map(str::to_string));
    }
}

#[async_trait]
impl EncryptionService for RecordingService {
    async fn encrypt(&self, plaintext: &str, key: Option<&str>) -> Result<String, CipherError> {
        self.record(key);
        Ok(MockCipher::seal(plaintext, key))
    }

    async fn try_decrypt(&self, ciphertext: &str, key: Option<&str>) -> Option<String> {
        self.record(key);
        MockCipher::open(ciphertext, key)
    }

    async fn drop_key(&self, key: &str) -> Result<(), CipherError> {
        self.dropped.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
