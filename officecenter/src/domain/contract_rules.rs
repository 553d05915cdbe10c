//! 계약 조건 검증과 계약번호 규칙

use chrono::NaiveDate;
use shared::tool::error::AppError;
use shared::tool::YearMonth;

/// 생성/수정 시 검증하는 계약 조건
#[derive(Debug, Clone)]
pub struct ContractTerms {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_free_start: Option<NaiveDate>,
    pub rent_free_end: Option<NaiveDate>,
    pub payment_day: Option<i32>,
    pub monthly_rent: i64,
    pub deposit: i64,
    pub management_fee: i64,
}

impl ContractTerms {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.end_date < self.start_date {
            return Err(AppError::InvalidInput(
                "계약 종료일은 시작일보다 빠를 수 없습니다".to_string(),
            ));
        }

        match (self.rent_free_start, self.rent_free_end) {
            (None, None) => {}
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(AppError::InvalidInput(
                        "렌트프리 종료일은 시작일보다 빠를 수 없습니다".to_string(),
                    ));
                }
            }
            _ => {
                return Err(AppError::InvalidInput(
                    "렌트프리 기간은 시작일과 종료일을 모두 입력해야 합니다".to_string(),
                ))
            }
        }

        if let Some(day) = self.payment_day {
            if !(1..=31).contains(&day) {
                return Err(AppError::InvalidInput(format!(
                    "납부일은 1~31 사이여야 합니다: {}",
                    day
                )));
            }
        }

        for (field, amount) in [
            ("월 임대료", self.monthly_rent),
            ("보증금", self.deposit),
            ("관리비", self.management_fee),
        ] {
            if amount < 0 {
                return Err(AppError::InvalidInput(format!(
                    "{}은(는) 0 이상이어야 합니다",
                    field
                )));
            }
        }

        Ok(())
    }
}

/// 계약 종료일 검증 - 계약 시작일 이전으로는 종료할 수 없습니다.
pub fn validate_termination_date(
    start_date: NaiveDate,
    termination_date: NaiveDate,
) -> Result<(), AppError> {
    if termination_date < start_date {
        return Err(AppError::InvalidInput(
            "종료일은 계약 시작일보다 빠를 수 없습니다".to_string(),
        ));
    }
    Ok(())
}

/// `C{yyyymm}-{순번:04}`
pub fn format_contract_number(month: YearMonth, sequence: u32) -> String {
    format!("C{:04}{:02}-{:04}", month.year(), month.month(), sequence)
}

/// 같은 월의 마지막 계약번호 다음 번호
pub fn next_contract_number(month: YearMonth, latest: Option<&str>) -> String {
    let prefix = format_contract_number(month, 0);
    let prefix = &prefix[..prefix.len() - 4];

    let next = latest
        .and_then(|number| number.strip_prefix(prefix))
        .and_then(|seq| seq.parse::<u32>().ok())
        .map(|seq| seq + 1)
        .unwrap_or(1);

    format_contract_number(month, next)
}
