//! 서명 이미지 저장소
//!
//! `data:image/png;base64,...` 형식(또는 base64 본문만)의 서명을 디코딩해
//! `{UPLOAD_DIR}/signatures/` 아래에 PNG 파일로 저장합니다.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use shared::tool::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
/// 서명 이미지 최대 크기 (1 MiB)
pub const MAX_SIGNATURE_BYTES: usize = 1024 * 1024;
const SIGNATURE_DIR: &str = "signatures";

/// 서명자 구분 (파일명 접두어)
#[derive(Debug, Clone, Copy)]
pub enum Signer {
    Tenant,
    Admin,
}

impl Signer {
    fn as_str(&self) -> &'static str {
        match self {
            Signer::Tenant => "tenant",
            Signer::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignatureStorage {
    root: PathBuf,
}

impl SignatureStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: upload_dir.into(),
        }
    }

    pub fn signature_dir(&self) -> PathBuf {
        self.root.join(SIGNATURE_DIR)
    }

    /// 서명 이미지를 저장하고 업로드 디렉토리 기준 상대 경로를 돌려줍니다.
    pub async fn save(&self, signer: Signer, session_id: i64, signature: &str) -> AppResult<String> {
        let bytes = decode_signature(signature)?;

        let dir = self.signature_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!(
            "{}_{}_{}.png",
            signer.as_str(),
            session_id,
            Uuid::new_v4().simple()
        );
        tokio::fs::write(dir.join(&file_name), &bytes).await?;

        debug!(session_id, signer = signer.as_str(), size = bytes.len(), "서명 이미지 저장");
        Ok(format!("{}/{}", SIGNATURE_DIR, file_name))
    }

    /// 상대 경로를 실제 파일 경로로 바꿉니다. 저장소 밖을 가리키면 거부합니다.
    pub fn resolve(&self, relative: &str) -> AppResult<PathBuf> {
        let path = Path::new(relative);
        let escapes = path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir));
        if escapes {
            return Err(AppError::InvalidInput(format!("잘못된 파일 경로: {}", relative)));
        }
        Ok(self.root.join(path))
    }

    /// 저장된 서명 이미지를 문서에 넣을 data URL로 읽어옵니다.
    pub async fn load_data_url(&self, relative: &str) -> AppResult<String> {
        let bytes = tokio::fs::read(self.resolve(relative)?).await?;
        Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(bytes)))
    }
}

/// 서명 문자열을 PNG 바이트로 디코딩하고 형식/크기를 확인합니다.
pub fn decode_signature(signature: &str) -> AppResult<Vec<u8>> {
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(AppError::MissingField("signature".to_string()));
    }

    let encoded = match signature.strip_prefix(DATA_URL_PREFIX) {
        Some(body) => body,
        None if signature.starts_with("data:") => {
            return Err(AppError::InvalidFormat(
                "서명은 PNG 이미지(data:image/png;base64)여야 합니다".to_string(),
            ))
        }
        None => signature,
    };

    // base64 인코딩 크기로 먼저 걸러냅니다.
    if encoded.len() > MAX_SIGNATURE_BYTES / 3 * 4 + 4 {
        return Err(AppError::InvalidInput("서명 이미지가 1MB를 초과합니다".to_string()));
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| AppError::InvalidFormat(format!("서명 base64 디코딩 실패: {}", e)))?;

    if bytes.len() > MAX_SIGNATURE_BYTES {
        return Err(AppError::InvalidInput("서명 이미지가 1MB를 초과합니다".to_string()));
    }
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(AppError::InvalidFormat("PNG 이미지가 아닙니다".to_string()));
    }

    Ok(bytes)
}
