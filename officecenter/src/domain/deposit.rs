//! 계약 종료 시 보증금 처리

use shared::model::{DepositStatus, TerminationType, TransactionCategory};

/// 보증금 전환 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositConversion {
    pub category: TransactionCategory,
    pub deposit_status: DepositStatus,
    pub amount: i64,
    pub description: String,
}

/// 종료 유형에 따른 보증금 전환
///
/// 중도종료는 위약금, 만기종료는 마지막 달 사용료 수입으로 전환됩니다.
/// 보증금이 없거나 이미 처리된 경우 `None`.
pub fn convert_on_termination(
    termination: TerminationType,
    deposit: i64,
    deposit_status: DepositStatus,
    company_name: &str,
    room_number: &str,
) -> Option<DepositConversion> {
    if deposit <= 0 || deposit_status != DepositStatus::Held {
        return None;
    }

    let (category, deposit_status, label) = match termination {
        TerminationType::Early => (
            TransactionCategory::Penalty,
            DepositStatus::ConvertedToPenalty,
            "중도종료 위약금 (보증금 전환)",
        ),
        TerminationType::Expiry => (
            TransactionCategory::UsageFee,
            DepositStatus::ConvertedToUsageFee,
            "만기종료 마지막 달 사용료 (보증금 전환)",
        ),
    };

    Some(DepositConversion {
        category,
        deposit_status,
        amount: deposit,
        description: format!("{} {} {}", company_name, room_number, label),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_termination_becomes_penalty() {
        let conversion =
            convert_on_termination(TerminationType::Early, 1_000_000, DepositStatus::Held, "한빛상사", "301호")
                .unwrap();
        assert_eq!(conversion.category, TransactionCategory::Penalty);
        assert_eq!(conversion.deposit_status, DepositStatus::ConvertedToPenalty);
        assert_eq!(conversion.amount, 1_000_000);
        assert!(conversion.description.contains("위약금"));
    }

    #[test]
    fn test_expiry_becomes_usage_fee() {
        let conversion =
            convert_on_termination(TerminationType::Expiry, 500_000, DepositStatus::Held, "한빛상사", "301호")
                .unwrap();
        assert_eq!(conversion.category, TransactionCategory::UsageFee);
        assert_eq!(conversion.deposit_status, DepositStatus::ConvertedToUsageFee);
    }

    #[test]
    fn test_no_conversion_without_held_deposit() {
        assert!(convert_on_termination(TerminationType::Early, 0, DepositStatus::Held, "a", "b").is_none());
        assert!(
            convert_on_termination(TerminationType::Expiry, 500_000, DepositStatus::Returned, "a", "b")
                .is_none()
        );
    }
}
