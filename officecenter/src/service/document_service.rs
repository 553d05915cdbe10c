//! 계약서 문서 생성
//!
//! 내장 HTML 템플릿을 handlebars로 렌더링합니다. 값은 handlebars 기본 규칙에 따라
//! HTML 이스케이프되며, 값 안의 `{{...}}`는 다시 해석되지 않습니다.

use chrono::{DateTime, Local, Utc};
use handlebars::Handlebars;
use serde_json::json;
use shared::model::{ContractDetail, SigningSession, Tenant};
use shared::tool::error::{AppError, AppResult};
use shared::tool::format_won;
use std::sync::Arc;

const CONTRACT_TEMPLATE_NAME: &str = "contract";
const CONTRACT_TEMPLATE: &str = include_str!("../../templates/contract.html");

/// 계약서에 넣을 서명 이미지 (`data:image/png;base64,...`)
#[derive(Debug, Default, Clone)]
pub struct SignatureImages {
    pub tenant: Option<String>,
    pub admin: Option<String>,
}

fn signed_label(signer: Option<&str>, signed_at: Option<DateTime<Utc>>) -> String {
    match signed_at {
        Some(at) => format!(
            "{} (서명 완료 {})",
            signer.unwrap_or("서명"),
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => "(미서명)".to_string(),
    }
}

/// 계약서 렌더러. 템플릿은 생성 시 한 번 등록합니다.
#[derive(Clone)]
pub struct ContractRenderer {
    handlebars: Arc<Handlebars<'static>>,
}

impl ContractRenderer {
    pub fn new() -> AppResult<Self> {
        let mut handlebars = Handlebars::new();
        // 템플릿에 없는 값을 참조하면 빈 문자열 대신 에러
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(CONTRACT_TEMPLATE_NAME, CONTRACT_TEMPLATE)
            .map_err(|e| AppError::Configuration(format!("계약서 템플릿 오류: {}", e)))?;

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    /// 계약서 HTML
    pub fn render(
        &self,
        detail: &ContractDetail,
        tenant: &Tenant,
        session: Option<&SigningSession>,
        images: &SignatureImages,
    ) -> AppResult<String> {
        let contract = &detail.contract;
        let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

        let rent_free = match (contract.rent_free_start, contract.rent_free_end) {
            (Some(start), Some(end)) => format!("{} ~ {}", start, end),
            _ => "없음".to_string(),
        };
        let payment_day = contract
            .payment_day
            .map(|day| format!("매월 {}일", day))
            .unwrap_or_else(|| "계약 시작일과 같은 날".to_string());

        let tenant_signature = session
            .map(|s| signed_label(s.tenant_signer_name.as_deref(), s.tenant_signed_at))
            .unwrap_or_else(|| "(미서명)".to_string());
        let admin_signature = session
            .map(|s| signed_label(Some("임대인"), s.admin_signed_at))
            .unwrap_or_else(|| "(미서명)".to_string());

        let data = json!({
            "contract_number": contract.contract_number,
            "room_number": detail.room_number,
            "company_name": detail.company_name,
            "representative": or_dash(&tenant.representative),
            "business_number": or_dash(&tenant.business_number),
            "phone": or_dash(&tenant.phone),
            "start_date": contract.start_date.to_string(),
            "end_date": contract.end_date.to_string(),
            "monthly_rent": format_won(contract.monthly_rent),
            "management_fee": format_won(contract.management_fee),
            "deposit": format_won(contract.deposit),
            "rent_free": rent_free,
            "payment_day": payment_day,
            "memo": contract.memo.clone().unwrap_or_default(),
            "tenant_signature": tenant_signature,
            "tenant_signature_image": images.tenant,
            "admin_signature": admin_signature,
            "admin_signature_image": images.admin,
            "issued_date": Local::now().date_naive().to_string(),
        });

        self.handlebars
            .render(CONTRACT_TEMPLATE_NAME, &data)
            .map_err(|e| AppError::InternalError(format!("계약서 렌더링 실패: {}", e)))
    }
}
