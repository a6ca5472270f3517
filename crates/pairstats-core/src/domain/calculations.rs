//! 손익 및 R 배수 계산 공통 로직.
//!
//! 통계 엔진의 모든 집계는 이 함수들을 통해서만 거래 단위 값을 얻습니다.
//! 나눗셈과 곱셈은 오버플로 시 `Decimal::MAX`/`Decimal::MIN`으로 포화되며 패닉하지 않습니다.

use rust_decimal::Decimal;

/// 순손익 계산 (총손익 - 수수료).
pub fn net_pnl(gross_pnl: Decimal, fee: Decimal) -> Decimal {
    gross_pnl.saturating_sub(fee)
}

/// R 배수 계산.
///
/// 손익을 1R 금액(`max_loss`)의 절대값으로 나눕니다.
/// `max_loss`가 0이면 R 정규화를 하지 않고 0을 반환합니다.
///
/// # Examples
///
/// ```
/// use pairstats_core::r_multiple;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(r_multiple(dec!(90), dec!(50)), dec!(1.8));
/// assert_eq!(r_multiple(dec!(90), dec!(-50)), dec!(1.8));
/// assert_eq!(r_multiple(dec!(-40), dec!(0)), dec!(0));
/// ```
pub fn r_multiple(pnl: Decimal, max_loss: Decimal) -> Decimal {
    ratio_or_zero(pnl, max_loss.abs())
}

/// 분모가 0이면 0을 반환하는 나눗셈.
///
/// 몫이 표현 범위를 넘으면 부호에 따라 `Decimal::MAX` 또는 `Decimal::MIN`을 반환합니다.
///
/// ```
/// use pairstats_core::ratio_or_zero;
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(ratio_or_zero(dec!(10), dec!(4)), dec!(2.5));
/// assert_eq!(ratio_or_zero(dec!(10), Decimal::ZERO), Decimal::ZERO);
/// assert_eq!(ratio_or_zero(dec!(1000000000000), Decimal::new(1, 18)), Decimal::MAX);
/// ```
pub fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator
        .checked_div(denominator)
        .unwrap_or_else(|| saturate(numerator.is_sign_negative() != denominator.is_sign_negative()))
}

/// 오버플로 시 포화되는 합계.
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

fn saturate(negative: bool) -> Decimal {
    if negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Decimal 제곱근 (뉴턴-랩슨 방식).
///
/// 음수나 0에 대해서는 0을 반환합니다.
pub fn decimal_sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    // 1보다 작은 값은 value/2가 해보다 작아 수렴이 느리므로 1에서 시작
    let mut guess = if value > Decimal::ONE {
        value / Decimal::TWO
    } else {
        Decimal::ONE
    };
    let precision = Decimal::new(1, 12);

    for _ in 0..100 {
        let next_guess = (guess + value / guess) / Decimal::TWO;
        if (next_guess - guess).abs() < precision {
            return next_guess;
        }
        guess = next_guess;
    }

    guess
}

/// 모표준편차 (표본 보정 없이 n으로 나눔).
pub fn population_std_dev(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }

    let n = Decimal::from(values.len());
    let mean = ratio_or_zero(saturating_sum(values.iter().copied()), n);
    let variance = ratio_or_zero(
        saturating_sum(values.iter().map(|v| {
            let diff = v.saturating_sub(mean);
            diff.saturating_mul(diff)
        })),
        n,
    );

    decimal_sqrt(variance)
}
