//! 호실 상태 전이 규칙
//!
//! 상태가 바뀔 때 현재 입주사/직전 입주사 필드를 어떻게 남길지 결정합니다.

use shared::model::RoomStatus;
use shared::tool::error::AppError;

/// 호실의 입주사 관련 필드
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OccupantFields {
    pub current_tenant_id: Option<i64>,
    pub current_company_name: Option<String>,
    pub last_company_name: Option<String>,
}

/// 상태 변경 요청에 함께 들어온 입주사 정보
#[derive(Debug, Clone, Default)]
pub struct Occupant {
    pub tenant_id: Option<i64>,
    pub company_name: Option<String>,
}

impl Occupant {
    pub fn is_empty(&self) -> bool {
        self.tenant_id.is_none() && self.company_name.is_none()
    }
}

/// 새 상태에 맞게 입주사 필드를 계산합니다.
///
/// - 입주: 입주사 필수, 직전 입주사는 지웁니다.
/// - 예약: 입주사(선택)를 현재 입주사로, 직전 입주사는 그대로 둡니다.
/// - 공실/계약종료/정비중: 현재 입주사를 비우고 나가는 회사명을 직전 입주사로 남깁니다.
pub fn transition(
    current: &OccupantFields,
    next: RoomStatus,
    occupant: Occupant,
) -> Result<OccupantFields, AppError> {
    match next {
        RoomStatus::Occupied => {
            if occupant.is_empty() {
                return Err(AppError::MissingField(
                    "입주 상태에는 입주사(tenant_id 또는 company_name)가 필요합니다".to_string(),
                ));
            }
            Ok(OccupantFields {
                current_tenant_id: occupant.tenant_id,
                current_company_name: occupant.company_name,
                last_company_name: None,
            })
        }
        RoomStatus::Reserved => Ok(OccupantFields {
            current_tenant_id: occupant.tenant_id,
            current_company_name: occupant.company_name,
            last_company_name: current.last_company_name.clone(),
        }),
        RoomStatus::Vacant | RoomStatus::ContractEnded | RoomStatus::Maintenance => {
            Ok(OccupantFields {
                current_tenant_id: None,
                current_company_name: None,
                last_company_name: current
                    .current_company_name
                    .clone()
                    .or_else(|| current.last_company_name.clone()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupied_by(company: &str) -> OccupantFields {
        OccupantFields {
            current_tenant_id: Some(7),
            current_company_name: Some(company.to_string()),
            last_company_name: Some("이전상사".to_string()),
        }
    }

    #[test]
    fn test_occupy_requires_occupant() {
        let result = transition(&OccupantFields::default(), RoomStatus::Occupied, Occupant::default());
        assert!(matches!(result, Err(AppError::MissingField(_))));
    }

    #[test]
    fn test_occupy_clears_last_company() {
        let current = OccupantFields {
            last_company_name: Some("이전상사".to_string()),
            ..Default::default()
        };
        let next = transition(
            &current,
            RoomStatus::Occupied,
            Occupant {
                tenant_id: Some(3),
                company_name: Some("새회사".to_string()),
            },
        )
        .unwrap();

        assert_eq!(next.current_tenant_id, Some(3));
        assert_eq!(next.current_company_name.as_deref(), Some("새회사"));
        assert_eq!(next.last_company_name, None);
    }

    #[test]
    fn test_vacancy_moves_current_company_to_last() {
        let next = transition(&occupied_by("한빛상사"), RoomStatus::Vacant, Occupant::default()).unwrap();
        assert_eq!(next.current_tenant_id, None);
        assert_eq!(next.current_company_name, None);
        assert_eq!(next.last_company_name.as_deref(), Some("한빛상사"));
    }

    #[test]
    fn test_vacancy_keeps_existing_last_company_without_current() {
        let current = OccupantFields {
            last_company_name: Some("이전상사".to_string()),
            ..Default::default()
        };
        for status in [RoomStatus::Vacant, RoomStatus::ContractEnded, RoomStatus::Maintenance] {
            let next = transition(&current, status, Occupant::default()).unwrap();
            assert_eq!(next.last_company_name.as_deref(), Some("이전상사"));
        }
    }

    #[test]
    fn test_reservation_preserves_last_company() {
        let current = OccupantFields {
            last_company_name: Some("이전상사".to_string()),
            ..Default::default()
        };
        let next = transition(
            &current,
            RoomStatus::Reserved,
            Occupant {
                tenant_id: None,
                company_name: Some("예약상사".to_string()),
            },
        )
        .unwrap();

        assert_eq!(next.current_company_name.as_deref(), Some("예약상사"));
        assert_eq!(next.last_company_name.as_deref(), Some("이전상사"));
    }

    #[test]
    fn test_reservation_without_occupant() {
        let next = transition(&OccupantFields::default(), RoomStatus::Reserved, Occupant::default()).unwrap();
        assert_eq!(next, OccupantFields::default());
    }
}
