use position_planner::engine::{EntryExitPlanner, ExitPlanner};
use position_planner::triggers::StopStatus;
use position_planner::{
    EngineError, HorizonParams, PlanSettings, PositionLedger, PriceSeries, Symbol, Timestamp,
    TradeId, TradeInput, TriggerEvaluator, TriggerKind,
};

fn params() -> HorizonParams {
    HorizonParams {
        horizon_count: 3,
        fee_spread: 0.01,
        generate_stop_losses: true,
        ..Default::default()
    }
}

fn btc() -> Symbol {
    Symbol::new("BTC")
}

#[test]
fn test_sells_never_exceed_parent_quantity() {
    let mut ledger = PositionLedger::new();
    let parent = ledger
        .record_buy(TradeInput::new("btc", 100.0, 1.0))
        .unwrap();

    for _ in 0..3 {
        ledger
            .record_covered_sell(parent, TradeInput::new("BTC", 110.0, 0.3))
            .unwrap();
    }
    let err = ledger
        .record_covered_sell(parent, TradeInput::new("BTC", 110.0, 0.2))
        .unwrap_err();
    match err {
        EngineError::Oversold { remaining, .. } => assert!((remaining - 0.1).abs() < 1e-9),
        other => panic!("Expected Oversold, got {:?}", other),
    }

    ledger
        .record_covered_sell(parent, TradeInput::new("BTC", 110.0, 0.1))
        .unwrap();
    assert!(ledger.remaining_quantity(parent).unwrap().abs() < 1e-9);
    assert!((ledger.sold_quantity_for_parent(parent) - 1.0).abs() < 1e-9);
}

#[test]
fn test_deleted_ids_are_reissued() {
    let mut ledger = PositionLedger::new();
    let a = ledger.record_buy(TradeInput::new("btc", 1.0, 1.0)).unwrap();
    let b = ledger.record_buy(TradeInput::new("eth", 1.0, 1.0)).unwrap();
    let c = ledger.record_buy(TradeInput::new("sol", 1.0, 1.0)).unwrap();
    assert_eq!((a, b, c), (TradeId::new(1), TradeId::new(2), TradeId::new(3)));

    ledger.delete_trade(b).unwrap();
    assert!(ledger.trade_ids().is_available(2));
    let d = ledger.record_buy(TradeInput::new("ada", 1.0, 1.0)).unwrap();
    assert_eq!(d, b);
}

#[test]
fn test_price_check_workflow() {
    let mut ledger = PositionLedger::new();
    ledger.reserve_trade_ids([1]);
    let id = ledger
        .record_buy(
            TradeInput::new("btc", 100.0, 2.0)
                .with_fees(1.0, 0.0)
                .at(Timestamp::new(1_700_000_000)),
        )
        .unwrap();
    assert_eq!(id, TradeId::new(2));

    let horizons = ledger.plan_horizons(id, &params(), true).unwrap();
    // per-unit TP of the first horizon is entry * 1.01
    assert!((horizons[0].take_profit / 2.0 - 101.0).abs() < 1e-9);
    ledger.set_take_profit(id, horizons[0].take_profit, 0.5).unwrap();

    let trade = ledger.trade(id).cloned().unwrap();
    let exits = ExitPlanner::generate(&trade, &params(), 0.0, 1.0, 4.0);
    ledger.queue_exits(id, &exits).unwrap();

    let mut prices = PriceSeries::from_trades(ledger.trades());
    assert_eq!(prices.latest(&btc()), Some(100.0));
    prices.set(btc(), Timestamp::new(1_700_000_060), 101.5);

    let check = TriggerEvaluator::scan(&ledger, &prices);
    assert_eq!(check.trades.len(), 1);
    let trade_check = &check.trades[0];
    assert!(trade_check.tp_hit);
    assert!(!trade_check.sl_hit);
    assert_eq!(trade_check.horizons.len(), 3);
    assert!(trade_check.horizons[0].tp_hit);
    assert!(!trade_check.horizons[1].tp_hit);
    // generated horizon stops start inactive
    assert_eq!(trade_check.horizons[0].sl_status, StopStatus::Off);
    assert!((trade_check.horizons[0].stop_loss - 99.0).abs() < 1e-9);

    let triggers: Vec<_> = check.triggers().collect();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].kind, TriggerKind::TakeProfit);
    assert!((triggers[0].sell_qty - 1.0).abs() < 1e-12);

    // only the first exit level (TP 101) is reached
    assert_eq!(check.exits.len(), 1);
    assert_eq!(check.exits[0].level_index, 0);

    // the trade's own stop was activated from the first horizon
    prices.set(btc(), Timestamp::new(1_700_000_120), 98.0);
    let check = TriggerEvaluator::scan(&ledger, &prices);
    assert!(check.trades[0].sl_hit);
    assert!(!check.trades[0].tp_hit);
    assert!((check.trades[0].sl_price - 99.0).abs() < 1e-9);
    assert!(check.exits.is_empty());
    // the stop sells the default fraction of everything held
    let triggers: Vec<_> = check.triggers().collect();
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].kind, TriggerKind::StopLoss);
    assert!((triggers[0].sell_qty - 2.0).abs() < 1e-12);
}

#[test]
fn test_entry_to_exit_cycle() {
    let mut ledger = PositionLedger::new();
    ledger.deposit(10_000.0).unwrap();

    let p = HorizonParams {
        portfolio_pump: 1000.0,
        ..params()
    };
    let settings = PlanSettings {
        range_below: 20.0,
        ..Default::default()
    };
    let planned = EntryExitPlanner::plan(100.0, 10.0, &p, &settings);
    let stored = ledger.store_entry_points("btc", &planned);
    assert!(stored.iter().all(|ep| ep.entry_id > 0 && ep.symbol == btc()));

    // the market drops into the ladder
    let mut prices = PriceSeries::new();
    prices.set(btc(), Timestamp::new(60), 90.0);
    let check = TriggerEvaluator::scan(&ledger, &prices);
    assert!(!check.entries.is_empty());
    assert!(check.entries.iter().all(|ep| ep.level.entry_price >= 90.0));

    let entry = check
        .entries
        .iter()
        .find(|ep| ep.level.funding_qty > 0.0)
        .cloned()
        .unwrap();
    let cost = entry.level.entry_price * entry.level.funding_qty + 0.5;
    let trade_id = ledger.execute_entry(entry.entry_id, 0.5).unwrap();
    assert!((ledger.wallet_balance() - (10_000.0 - cost)).abs() < 1e-6);
    let check = TriggerEvaluator::scan(&ledger, &prices);
    assert!(check.entries.iter().all(|ep| ep.entry_id != entry.entry_id));

    let trade = ledger.trade(trade_id).cloned().unwrap();
    let exits = ExitPlanner::generate(&trade, &p, 0.5, 1.0, 4.0);
    let queued = ledger.queue_exits(trade_id, &exits).unwrap();
    assert!(matches!(
        ledger.queue_exits(trade_id, &exits),
        Err(EngineError::Oversold { .. })
    ));

    let before = ledger.wallet_balance();
    let mut filled = 0.0;
    for order in &queued {
        ledger.fill_exit(order.order_id, order.trigger_price, 0.1).unwrap();
        filled += order.trigger_price * order.sell_qty - 0.1;
    }
    assert!((ledger.wallet_balance() - before - filled).abs() < 1e-6);
    assert!(ledger.pending_exits().is_empty());
    assert!(ledger.remaining_quantity(trade_id).unwrap() < 1e-9);

    let history = ledger.pnl_history();
    assert_eq!(history.len(), queued.len());
    let total: f64 = history.iter().map(|r| r.net_profit).sum();
    assert!((ledger.realized_pnl() - total).abs() < 1e-9);
    assert!(ledger.realized_pnl() > 0.0);
    assert!(ledger
        .exit_plan(trade_id)
        .iter()
        .all(|level| level.level_sell_fee == 0.1));
}

#[test]
fn test_position_report_after_partial_exit() {
    let mut ledger = PositionLedger::new();
    let id = ledger
        .record_buy(TradeInput::new("eth", 2000.0, 1.0).with_fees(4.0, 0.0))
        .unwrap();
    ledger
        .record_covered_sell(id, TradeInput::new("eth", 2200.0, 0.25).with_fees(0.0, 1.0))
        .unwrap();

    let report = ledger.position_report(id, 2100.0).unwrap();
    assert!((report.remaining - 0.75).abs() < 1e-12);
    assert!((report.realized.gross_profit - 50.0).abs() < 1e-9);
    assert!((report.realized.net_profit - 49.0).abs() < 1e-9);
    // 75 gross minus 3 of pro-rated buy fee
    assert!((report.unrealized.net_profit - 72.0).abs() < 1e-9);
    assert!((report.combined_net - 121.0).abs() < 1e-9);
    assert!((ledger.deployed_capital() - 1503.0).abs() < 1e-9);

    assert_eq!(
        ledger.position_report(TradeId::new(99), 1.0).unwrap_err(),
        EngineError::TradeNotFound(TradeId::new(99))
    );
}
