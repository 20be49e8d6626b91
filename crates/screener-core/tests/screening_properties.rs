//! 스크리닝 엔진 속성 기반 테스트
//!
//! 임의의 스냅샷과 필터 설정에 대해 다음이 항상 성립하는지 검증합니다:
//! - 더 엄격한 설정의 결과는 느슨한 설정 결과의 부분집합
//! - 결과는 PSR 오름차순
//! - 빈 값이 있는 스냅샷은 결과에 나타나지 않음

use proptest::prelude::*;
use std::collections::HashSet;
use screener_core::{screen, FilterConfig, RawQuote, TickerSymbol};

fn arb_metric() -> impl Strategy<Value = Option<f64>> {
    proptest::option::weighted(0.85, -50.0f64..50.0)
}

fn arb_quote(index: usize) -> impl Strategy<Value = RawQuote> {
    (
        prop_oneof![9 => 0.0f64..1e8, 1 => Just(f64::NAN)],
        arb_metric(),
        arb_metric(),
        arb_metric(),
        arb_metric(),
        0.0f64..100.0,
        -20.0f64..40.0,
        prop_oneof![9 => -50.0f64..50.0, 1 => Just(f64::NAN)],
    )
        .prop_map(
            move |(liquidity, ebit, pe, ev, psr, margin, roa, ret)| RawQuote {
                ticker: TickerSymbol::new(format!("T{:03}", index)),
                liquidity,
                ebit,
                pe_ratio: pe,
                ev_ebitda: ev,
                price_to_sales: psr,
                gross_margin_pct: margin,
                roa_pct: roa,
                trailing_return_pct: ret,
            },
        )
}

/// 티커가 서로 다른 스냅샷 목록
fn arb_quotes() -> impl Strategy<Value = Vec<RawQuote>> {
    (0usize..40).prop_flat_map(|n| (0..n).map(arb_quote).collect::<Vec<_>>())
}

fn arb_config() -> impl Strategy<Value = FilterConfig> {
    (
        0.0f64..5e7,
        -10.0f64..40.0,
        -10.0f64..40.0,
        0.0f64..80.0,
        -10.0f64..20.0,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(liq, pe, ev, margin, roa, ret, ebit)| FilterConfig {
            min_liquidity: liq,
            max_pe: pe,
            max_ev_ebitda: ev,
            min_gross_margin_pct: margin,
            min_roa_pct: roa,
            require_positive_return: ret,
            require_positive_ebit: ebit,
        })
}

/// 기준 설정과 그보다 같거나 더 엄격한 설정의 쌍
fn arb_config_pair() -> impl Strategy<Value = (FilterConfig, FilterConfig)> {
    (
        arb_config(),
        (0.0f64..1e7, 0.0f64..10.0, 0.0f64..10.0, 0.0f64..20.0, 0.0f64..10.0),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(loose, (d_liq, d_pe, d_ev, d_margin, d_roa), ret, ebit)| {
            let strict = FilterConfig {
                min_liquidity: loose.min_liquidity + d_liq,
                max_pe: loose.max_pe - d_pe,
                max_ev_ebitda: loose.max_ev_ebitda - d_ev,
                min_gross_margin_pct: loose.min_gross_margin_pct + d_margin,
                min_roa_pct: loose.min_roa_pct + d_roa,
                require_positive_return: loose.require_positive_return || ret,
                require_positive_ebit: loose.require_positive_ebit || ebit,
            };
            (loose, strict)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// 더 엄격한 설정의 결과는 항상 느슨한 설정 결과에 포함된다
    #[test]
    fn prop_stricter_config_yields_subset(
        quotes in arb_quotes(),
        (loose, strict) in arb_config_pair(),
    ) {
        let loose_set: HashSet<_> = screen(&quotes, &loose).tickers().into_iter().collect();
        let strict_result = screen(&quotes, &strict);

        for ticker in strict_result.tickers() {
            prop_assert!(loose_set.contains(&ticker), "{} not in loose result", ticker);
        }
    }

    /// 인접한 모든 행은 PSR 오름차순이고 순위는 0부터 연속이다
    #[test]
    fn prop_result_sorted_by_psr(quotes in arb_quotes(), config in arb_config()) {
        let result = screen(&quotes, &config);

        for pair in result.rows.windows(2) {
            prop_assert!(pair[0].price_to_sales <= pair[1].price_to_sales);
        }
        for (i, row) in result.iter().enumerate() {
            prop_assert_eq!(row.rank, i);
        }
    }

    /// 빈 값이 있는 스냅샷은 어떤 설정에서도 결과에 없다
    #[test]
    fn prop_incomplete_quotes_never_survive(quotes in arb_quotes(), config in arb_config()) {
        let incomplete: HashSet<_> = quotes
            .iter()
            .filter(|q| !q.is_complete())
            .map(|q| q.ticker.clone())
            .collect();

        let result = screen(&quotes, &config);
        for row in result.iter() {
            prop_assert!(!incomplete.contains(&row.ticker));
        }
    }

    /// 엔진은 입력을 변경하지 않는다
    #[test]
    fn prop_input_not_mutated(quotes in arb_quotes(), config in arb_config()) {
        let before = format!("{:?}", quotes);
        let _ = screen(&quotes, &config);
        prop_assert_eq!(before, format!("{:?}", quotes));
    }
}

#[test]
fn test_all_filters_disabled_keeps_every_complete_quote() {
    let quotes: Vec<RawQuote> = (0..5)
        .map(|i| RawQuote {
            liquidity: 0.0,
            ebit: Some(-1.0),
            pe_ratio: Some(100.0),
            ev_ebitda: Some(100.0),
            price_to_sales: Some(5.0 - i as f64),
            gross_margin_pct: 0.0,
            roa_pct: -5.0,
            trailing_return_pct: -10.0,
            ..RawQuote::new(format!("Q{}", i))
        })
        .collect();

    let config = FilterConfig {
        min_liquidity: 0.0,
        max_pe: f64::INFINITY,
        max_ev_ebitda: f64::INFINITY,
        min_gross_margin_pct: f64::NEG_INFINITY,
        min_roa_pct: f64::NEG_INFINITY,
        require_positive_return: false,
        require_positive_ebit: false,
    };

    let result = screen(&quotes, &config);
    assert_eq!(result.len(), 5);
    assert_eq!(result.rows[0].ticker.as_str(), "Q4");
    assert_eq!(result.rows[4].ticker.as_str(), "Q0");
}
