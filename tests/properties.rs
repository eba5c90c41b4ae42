use msaf_engine::clmm::ClmmPosition;
use msaf_engine::exit::split_exit_distribution;
use msaf_engine::*;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, failure_persistence: None, .. ProptestConfig::default() })]

    #[test]
    fn prop_pool_price_stays_positive(
        usdc in 1.0f64..1e9,
        tokens in 1.0f64..1e10,
        usdc_added in 0.0f64..1e8,
        token_added in 0.0f64..1e9,
        tokens_sold in 0.0f64..1e12,
        tokens_burned in 0.0f64..1e9,
    ) {
        let pool = Pool::new(usdc, tokens);
        let next = step_pool(&pool, &DayFlows { usdc_added, token_added, tokens_sold, tokens_burned, buyback_usdc: 0.0 });
        prop_assert!(next.price > 0.0);
        prop_assert!(next.token_balance >= 1.0);
        prop_assert!(next.usdc_balance >= 1.0 - 1e-6);
        prop_assert!(next.total_burned >= pool.total_burned);
    }

    #[test]
    fn prop_ratio_preserving_add_keeps_price(
        usdc in 1_000.0f64..1e9,
        tokens in 1_000.0f64..1e10,
        fraction in 0.0f64..10.0,
    ) {
        let pool = Pool::new(usdc, tokens);
        let flows = DayFlows { usdc_added: usdc * fraction, token_added: tokens * fraction, ..Default::default() };
        let next = step_pool(&pool, &flows);
        prop_assert!((next.price - pool.price).abs() <= pool.price * 1e-9);
    }

    #[test]
    fn prop_exit_split_is_complete(
        released in 0.0f64..1e9,
        price in 1e-6f64..100.0,
        withdraw in 0.0f64..200.0,
        keep in 0.0f64..200.0,
        convert in 0.0f64..200.0,
        burn_ratio in 0.0f64..=100.0,
    ) {
        let mut config = Config::default();
        config.exit_burn_ratio = burn_ratio;
        let split = split_exit_distribution(released, price, &ExitPercents::new(withdraw, keep, convert), 2.0, &config);
        let tol = 1e-9 * released.max(1.0);
        prop_assert!((split.withdraw + split.keep + split.convert - released).abs() <= tol);
        prop_assert!((split.burn + split.secondary_market - split.withdraw).abs() <= tol);
        prop_assert!(split.secondary_market >= -tol);
    }

    #[test]
    fn prop_net_profit_never_negative(
        capital in 0.0f64..1e9,
        profit_rate in 0.0f64..0.5,
        fee_rate in 0.0f64..500.0,
        user_share in 0.0f64..=100.0,
    ) {
        let p = compute_trading_profit(capital, profit_rate, fee_rate, user_share, &Config::default());
        prop_assert!(p.net_profit >= 0.0);
        prop_assert!(p.user_profit >= 0.0);
        prop_assert!(p.platform_profit >= 0.0);
        prop_assert!(p.broker_profit >= 0.0);
    }

    #[test]
    fn prop_clmm_value_at_entry_equals_deposit(
        deposit in 1.0f64..1e7,
        lower in 0.001f64..1.0,
        width in 1.01f64..10.0,
        entry in 0.0001f64..20.0,
    ) {
        let upper = lower * width;
        let position = ClmmPosition::open(deposit, entry, lower, upper).expect("valid range");
        prop_assert!((position.value(entry) - deposit).abs() <= deposit * 1e-9);
        let (token, usdc) = position.amounts(upper * 2.0);
        prop_assert_eq!(token, 0.0);
        prop_assert!(usdc > 0.0);
    }

    #[test]
    fn prop_zero_order_run_matches_input_pool(days in 0u32..200) {
        let config = Config::default();
        let pool = Pool::from_config(&config);
        let out = run_simulation(&[], &config, days, &pool);
        prop_assert_eq!(out.len(), days as usize);
        prop_assert!(out.iter().all(|d| d.pool == pool));
    }
}
