//! 월별 청구 규칙

use chrono::{Datelike, NaiveDate};
use shared::model::Contract;
use shared::tool::{format_won, format_won_signed, YearMonth};

/// 렌트프리 판정 기준일
const RENT_FREE_REFERENCE_DAY: u32 = 15;

/// 청구 생성 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingDecision {
    Bill,
    /// 렌트프리 기간이 해당 월 15일을 포함
    SkipRentFree,
    /// 계약 기간이 해당 월과 겹치지 않음
    OutOfTerm,
}

/// 렌트프리 기간이 해당 월의 15일을 포함하는지
pub fn is_rent_free_month(
    rent_free_start: Option<NaiveDate>,
    rent_free_end: Option<NaiveDate>,
    month: YearMonth,
) -> bool {
    match (rent_free_start, rent_free_end) {
        (Some(start), Some(end)) => {
            let reference = month.day_clamped(RENT_FREE_REFERENCE_DAY);
            start <= reference && reference <= end
        }
        _ => false,
    }
}

pub fn decide(contract: &Contract, month: YearMonth) -> BillingDecision {
    if !month.overlaps(contract.start_date, contract.end_date) {
        return BillingDecision::OutOfTerm;
    }
    if is_rent_free_month(contract.rent_free_start, contract.rent_free_end, month) {
        return BillingDecision::SkipRentFree;
    }
    BillingDecision::Bill
}

/// 납부 기한: 납부일(말일 초과 시 말일), 없으면 계약 시작일과 같은 날
pub fn due_date(month: YearMonth, payment_day: Option<i32>, start_date: NaiveDate) -> NaiveDate {
    let day = payment_day
        .and_then(|d| u32::try_from(d).ok())
        .filter(|d| *d >= 1)
        .unwrap_or_else(|| start_date.day());
    month.day_clamped(day)
}

/// 입금 확인 거래의 적요
///
/// 청구액과 입금액이 다르면 `(청구 X원 / 입금 Y원, 차액 ±Z원)`을 덧붙입니다.
pub fn payment_description(
    month: YearMonth,
    company_name: &str,
    room_number: &str,
    billed: i64,
    paid: i64,
) -> String {
    let base = format!("{} {} {} 임대료", month, company_name, room_number);
    if billed == paid {
        return base;
    }
    format!(
        "{} (청구 {}원 / 입금 {}원, 차액 {}원)",
        base,
        format_won(billed),
        format_won(paid),
        format_won_signed(paid - billed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::model::{ContractStatus, DepositStatus};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn contract(start: NaiveDate, end: NaiveDate) -> Contract {
        Contract {
            id: 1,
            contract_number: "C202401-0001".to_string(),
            room_id: 1,
            tenant_id: 1,
            start_date: start,
            end_date: end,
            monthly_rent: 500_000,
            deposit: 1_000_000,
            management_fee: 50_000,
            rent_free_start: None,
            rent_free_end: None,
            payment_day: None,
            status: ContractStatus::Active,
            deposit_status: DepositStatus::Held,
            termination_date: None,
            termination_memo: None,
            is_active: true,
            signed_at: None,
            memo: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rent_free_covers_fifteenth() {
        let month = ym("2024-03");
        assert!(is_rent_free_month(Some(date(2024, 3, 1)), Some(date(2024, 3, 31)), month));
        assert!(is_rent_free_month(Some(date(2024, 3, 15)), Some(date(2024, 3, 15)), month));
        assert!(!is_rent_free_month(Some(date(2024, 3, 1)), Some(date(2024, 3, 14)), month));
        assert!(!is_rent_free_month(Some(date(2024, 3, 16)), Some(date(2024, 4, 30)), month));
        assert!(!is_rent_free_month(None, None, month));
        assert!(!is_rent_free_month(Some(date(2024, 3, 1)), None, month));
    }

    #[test]
    fn test_decide() {
        let mut c = contract(date(2024, 1, 10), date(2024, 12, 31));
        assert_eq!(decide(&c, ym("2024-01")), BillingDecision::Bill);
        assert_eq!(decide(&c, ym("2023-12")), BillingDecision::OutOfTerm);
        assert_eq!(decide(&c, ym("2025-01")), BillingDecision::OutOfTerm);

        c.rent_free_start = Some(date(2024, 1, 10));
        c.rent_free_end = Some(date(2024, 2, 9));
        assert_eq!(decide(&c, ym("2024-01")), BillingDecision::SkipRentFree);
        assert_eq!(decide(&c, ym("2024-02")), BillingDecision::Bill);
    }

    #[test]
    fn test_due_date_clamps_to_month_end() {
        let start = date(2024, 1, 20);
        assert_eq!(due_date(ym("2024-02"), Some(31), start), date(2024, 2, 29));
        assert_eq!(due_date(ym("2024-04"), Some(10), start), date(2024, 4, 10));
        assert_eq!(due_date(ym("2024-04"), None, start), date(2024, 4, 20));
        assert_eq!(due_date(ym("2024-02"), None, date(2024, 1, 31)), date(2024, 2, 29));
    }

    #[test]
    fn test_payment_description_without_difference() {
        let text = payment_description(ym("2024-05"), "한빛상사", "301호", 550_000, 550_000);
        assert_eq!(text, "2024-05 한빛상사 301호 임대료");
    }

    #[test]
    fn test_payment_description_with_difference() {
        let text = payment_description(ym("2024-05"), "한빛상사", "301호", 550_000, 500_000);
        assert_eq!(
            text,
            "2024-05 한빛상사 301호 임대료 (청구 550,000원 / 입금 500,000원, 차액 -50,000원)"
        );

        let over = payment_description(ym("2024-05"), "한빛상사", "301호", 550_000, 600_000);
        assert!(over.ends_with("차액 +50,000원)"));
    }
}
