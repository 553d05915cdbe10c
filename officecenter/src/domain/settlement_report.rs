//! 월별 정산 보고서 집계

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::model::{RoomStatus, RoomType, TransactionCategory, TransactionType};
use shared::tool::YearMonth;

/// 거래 구분/항목별 합계 (집계 쿼리 결과)
#[derive(Debug, Clone)]
pub struct TransactionAggregate {
    pub transaction_type: TransactionType,
    pub category: TransactionCategory,
    pub total: i64,
}

/// 유형/상태별 호실 수 (집계 쿼리 결과)
#[derive(Debug, Clone)]
pub struct RoomCount {
    pub room_type: RoomType,
    pub status: RoomStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: TransactionCategory,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingSummary {
    pub billing_count: i64,
    pub billed_total: i64,
    pub collected_total: i64,
    pub outstanding_total: i64,
    pub unpaid_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: RoomStatus,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub total_rooms: i64,
    /// 회의실과 POST BOX를 제외한 임대용 호실
    pub leasable_rooms: i64,
    pub occupied_rooms: i64,
    pub post_box_count: i64,
    /// 입주율 (%) 소수점 첫째 자리
    pub occupancy_rate: f64,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    pub month: YearMonth,
    pub confirmed: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub total_income: i64,
    pub total_expense: i64,
    pub net_profit: i64,
    pub income_by_category: Vec<CategoryTotal>,
    pub expense_by_category: Vec<CategoryTotal>,
    pub billing: BillingSummary,
    pub rooms: RoomSummary,
    pub contracts_started: i64,
    pub contracts_ended: i64,
}

/// 입주율 = 입주 ÷ 임대용 호실 × 100 (소수점 첫째 자리 반올림)
pub fn occupancy_rate(occupied: i64, leasable: i64) -> f64 {
    if leasable <= 0 {
        return 0.0;
    }
    (occupied as f64 * 1000.0 / leasable as f64).round() / 10.0
}

pub fn summarize_rooms(counts: &[RoomCount]) -> RoomSummary {
    let total_rooms = counts.iter().map(|c| c.count).sum();
    let leasable_rooms = counts
        .iter()
        .filter(|c| c.room_type.is_leasable())
        .map(|c| c.count)
        .sum();
    let occupied_rooms = counts
        .iter()
        .filter(|c| c.room_type.is_leasable() && c.status == RoomStatus::Occupied)
        .map(|c| c.count)
        .sum();
    let post_box_count = counts
        .iter()
        .filter(|c| c.room_type == RoomType::PostBox)
        .map(|c| c.count)
        .sum();

    let by_status = RoomStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts
                .iter()
                .filter(|c| c.status == *status)
                .map(|c| c.count)
                .sum(),
        })
        .collect();

    RoomSummary {
        total_rooms,
        leasable_rooms,
        occupied_rooms,
        post_box_count,
        occupancy_rate: occupancy_rate(occupied_rooms, leasable_rooms),
        by_status,
    }
}

fn category_totals(totals: &[TransactionAggregate], kind: TransactionType) -> Vec<CategoryTotal> {
    TransactionCategory::ALL
        .iter()
        .filter_map(|category| {
            let amount: i64 = totals
                .iter()
                .filter(|t| t.transaction_type == kind && t.category == *category)
                .map(|t| t.total)
                .sum();
            (amount != 0).then_some(CategoryTotal {
                category: *category,
                amount,
            })
        })
        .collect()
}

impl SettlementReport {
    /// 집계 결과로 (미확정) 보고서를 만듭니다.
    pub fn assemble(
        month: YearMonth,
        totals: &[TransactionAggregate],
        billing: BillingSummary,
        rooms: &[RoomCount],
        contracts_started: i64,
        contracts_ended: i64,
    ) -> Self {
        let income_by_category = category_totals(totals, TransactionType::Income);
        let expense_by_category = category_totals(totals, TransactionType::Expense);
        let total_income: i64 = income_by_category.iter().map(|c| c.amount).sum();
        let total_expense: i64 = expense_by_category.iter().map(|c| c.amount).sum();

        Self {
            month,
            confirmed: false,
            confirmed_at: None,
            total_income,
            total_expense,
            net_profit: total_income - total_expense,
            income_by_category,
            expense_by_category,
            billing,
            rooms: summarize_rooms(rooms),
            contracts_started,
            contracts_ended,
        }
    }

    /// 확정 표시
    pub fn confirm(mut self, confirmed_at: DateTime<Utc>) -> Self {
        self.confirmed = true;
        self.confirmed_at = Some(confirmed_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(room_type: RoomType, status: RoomStatus, count: i64) -> RoomCount {
        RoomCount {
            room_type,
            status,
            count,
        }
    }

    #[test]
    fn test_occupancy_rate_rounding() {
        assert_eq!(occupancy_rate(0, 0), 0.0);
        assert_eq!(occupancy_rate(1, 3), 33.3);
        assert_eq!(occupancy_rate(2, 3), 66.7);
        assert_eq!(occupancy_rate(4, 4), 100.0);
    }

    #[test]
    fn test_room_summary_excludes_meeting_rooms_and_post_boxes() {
        let counts = vec![
            room(RoomType::Single, RoomStatus::Occupied, 3),
            room(RoomType::Single, RoomStatus::Vacant, 1),
            room(RoomType::MeetingRoom, RoomStatus::Occupied, 2),
            room(RoomType::PostBox, RoomStatus::Occupied, 5),
        ];
        let summary = summarize_rooms(&counts);

        assert_eq!(summary.total_rooms, 11);
        assert_eq!(summary.leasable_rooms, 4);
        assert_eq!(summary.occupied_rooms, 3);
        assert_eq!(summary.post_box_count, 5);
        assert_eq!(summary.occupancy_rate, 75.0);

        let occupied = summary
            .by_status
            .iter()
            .find(|s| s.status == RoomStatus::Occupied)
            .unwrap();
        assert_eq!(occupied.count, 10);
        assert_eq!(summary.by_status.len(), RoomStatus::ALL.len());
    }

    #[test]
    fn test_assemble_totals() {
        let totals = vec![
            TransactionAggregate {
                transaction_type: TransactionType::Income,
                category: TransactionCategory::Rent,
                total: 1_100_000,
            },
            TransactionAggregate {
                transaction_type: TransactionType::Income,
                category: TransactionCategory::Penalty,
                total: 500_000,
            },
            TransactionAggregate {
                transaction_type: TransactionType::Expense,
                category: TransactionCategory::Repair,
                total: 200_000,
            },
        ];
        let month: YearMonth = "2024-06".parse().unwrap();
        let report = SettlementReport::assemble(month, &totals, BillingSummary::default(), &[], 1, 0);

        assert_eq!(report.total_income, 1_600_000);
        assert_eq!(report.total_expense, 200_000);
        assert_eq!(report.net_profit, 1_400_000);
        assert_eq!(report.income_by_category.len(), 2);
        assert_eq!(report.income_by_category[0].category, TransactionCategory::Rent);
        assert!(!report.confirmed);
    }

    #[test]
    fn test_snapshot_survives_json() {
        let month: YearMonth = "2024-06".parse().unwrap();
        let report = SettlementReport::assemble(month, &[], BillingSummary::default(), &[], 0, 0)
            .confirm(Utc::now());
        let json = serde_json::to_string(&report).unwrap();
        let restored: SettlementReport = serde_json::from_str(&json).unwrap();
        assert!(restored.confirmed);
        assert_eq!(restored.month, month);
    }
}
