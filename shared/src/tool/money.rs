//! 금액 계산 유틸리티 (원 단위 정수)

/// 부가세 포함 금액에서 부가세를 계산합니다.
///
/// `round(amount - amount / 1.1)`
pub fn vat_of(amount: i64) -> i64 {
    let amount = amount as f64;
    (amount - amount / 1.1).round() as i64
}

/// 부가세 포함 금액을 (공급가액, 부가세)로 나눕니다.
pub fn split_vat(amount: i64) -> (i64, i64) {
    let vat = vat_of(amount);
    (amount - vat, vat)
}

/// 천 단위 구분 기호를 넣은 금액 문자열 (`1,234,000`)
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    if amount < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// 부호를 항상 붙인 금액 문자열 (`+10,000`, `-5,000`)
pub fn format_won_signed(amount: i64) -> String {
    if amount >= 0 {
        format!("+{}", format_won(amount))
    } else {
        format_won(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vat_of() {
        assert_eq!(vat_of(110_000), 10_000);
        assert_eq!(vat_of(550_000), 50_000);
        // 100000 - 90909.09 = 9090.9
        assert_eq!(vat_of(100_000), 9_091);
        assert_eq!(vat_of(0), 0);
    }

    #[test]
    fn test_split_vat() {
        let (supply, vat) = split_vat(330_000);
        assert_eq!(vat, 30_000);
        assert_eq!(supply, 300_000);
        assert_eq!(supply + vat, 330_000);
    }

    #[test]
    fn test_format_won() {
        assert_eq!(format_won(0), "0");
        assert_eq!(format_won(999), "999");
        assert_eq!(format_won(1_000), "1,000");
        assert_eq!(format_won(1_234_567), "1,234,567");
        assert_eq!(format_won(-50_000), "-50,000");
        assert_eq!(format_won_signed(10_000), "+10,000");
        assert_eq!(format_won_signed(-10_000), "-10,000");
    }
}
