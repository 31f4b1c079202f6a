//! End-to-end block acceptance
//!
//! Executes real action sequences against an in-memory ledger view, feeds
//! the results through the acceptor, and checks receipts, balances, counters,
//! and the order index all land where they should.

use energy_ledger::actions::{
    Action, CloseOrder, Consume, CreateOrder, FillOrder, IssueAsset, Produce, TypedAction,
};
use energy_ledger::metrics::Metrics;
use energy_ledger::records;
use energy_ledger::state::MemState;
use energy_ledger::{AssetId, Config, Id, Identity, ReceiptStore};
use energy_orderbook::{AcceptedBlock, AcceptedTx, Acceptor, OrderBook, Pair, TrackedPairs};
use tempfile::TempDir;

fn test_acceptor() -> (Acceptor, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.data_dir = temp_dir.path().to_path_buf();
    let store = ReceiptStore::open(&config).unwrap();
    let book = OrderBook::new(TrackedPairs::All);
    let metrics = Metrics::new().unwrap();
    (Acceptor::new(store, book, metrics), temp_dir)
}

fn run(state: &mut MemState, actor: Identity, seed: &[u8], action: TypedAction) -> AcceptedTx {
    let tx_id = Id::from_data(seed);
    let result = action.as_action().execute(state, &actor, &tx_id);
    AcceptedTx {
        tx_id,
        actor,
        action,
        result,
    }
}

#[test]
fn test_issue_produce_create_close_lifecycle() {
    let (acceptor, _temp) = test_acceptor();
    let producer = Identity::new([1u8; 32]);
    let mut state = MemState::new();

    let issue = run(
        &mut state,
        producer,
        b"issue",
        TypedAction::IssueAsset(IssueAsset {
            metadata: b"solar-mwh".to_vec(),
        }),
    );
    let asset = AssetId::Issued(issue.tx_id);

    let produce = run(
        &mut state,
        producer,
        b"produce",
        TypedAction::Produce(Produce {
            to: producer,
            asset,
            value: 500,
        }),
    );

    let create = run(
        &mut state,
        producer,
        b"create",
        TypedAction::CreateOrder(CreateOrder {
            input: AssetId::Native,
            in_tick: 2,
            output: asset,
            out_tick: 10,
            supply: 500,
        }),
    );
    let order_id = create.tx_id;

    // A failed consume still gets a receipt but never reaches the index
    // or the counters.
    let broke_consume = run(
        &mut state,
        Identity::new([9u8; 32]),
        b"broke",
        TypedAction::Consume(Consume { asset, value: 1 }),
    );
    assert!(!broke_consume.result.success);

    let block = AcceptedBlock {
        height: 1,
        timestamp: 1_000,
        txs: vec![issue, produce, create, broke_consume.clone()],
    };
    acceptor.accept_block(&block).unwrap();

    // Receipts: all four transactions, success flags preserved.
    let receipt = acceptor.store().get_receipt(&order_id).unwrap().unwrap();
    assert!(receipt.success);
    assert_eq!(receipt.units, 88);
    assert_eq!(receipt.timestamp, 1_000);
    let failed = acceptor
        .store()
        .get_receipt(&broke_consume.tx_id)
        .unwrap()
        .unwrap();
    assert!(!failed.success);
    assert_eq!(failed.units, 40);

    // Counters: one each for the successes, none for the failed consume.
    assert_eq!(acceptor.metrics().issue_asset.get(), 1);
    assert_eq!(acceptor.metrics().produce.get(), 1);
    assert_eq!(acceptor.metrics().create_order.get(), 1);
    assert_eq!(acceptor.metrics().consume.get(), 0);

    // Index: the new order is resting on its pair.
    let pair = Pair {
        input: AssetId::Native,
        output: asset,
    };
    let indexed = acceptor.book().best(&pair).unwrap();
    assert_eq!(indexed.id, order_id);
    assert_eq!(indexed.remaining, 500);

    // Ledger view: the escrow left the producer's balance.
    assert_eq!(
        records::get_balance(&state, &producer, &asset).unwrap(),
        0
    );

    // Close in the next block refunds and unindexes.
    let close = run(
        &mut state,
        producer,
        b"close",
        TypedAction::CloseOrder(CloseOrder {
            order: order_id,
            output: asset,
        }),
    );
    let block = AcceptedBlock {
        height: 2,
        timestamp: 2_000,
        txs: vec![close],
    };
    acceptor.accept_block(&block).unwrap();

    assert!(acceptor.book().is_empty());
    assert_eq!(
        records::get_balance(&state, &producer, &asset).unwrap(),
        500
    );
    assert!(records::get_order(&state, &order_id).unwrap().is_none());
}

#[test]
fn test_partial_then_exhausting_fill_updates_index() {
    let (acceptor, _temp) = test_acceptor();
    let producer = Identity::new([1u8; 32]);
    let filler = Identity::new([2u8; 32]);
    let mut state = MemState::new();

    let issue = run(
        &mut state,
        producer,
        b"issue",
        TypedAction::IssueAsset(IssueAsset {
            metadata: b"wind-mwh".to_vec(),
        }),
    );
    let asset = AssetId::Issued(issue.tx_id);
    let produce = run(
        &mut state,
        producer,
        b"produce",
        TypedAction::Produce(Produce {
            to: producer,
            asset,
            value: 100,
        }),
    );
    let create = run(
        &mut state,
        producer,
        b"create",
        TypedAction::CreateOrder(CreateOrder {
            input: AssetId::Native,
            in_tick: 2,
            output: asset,
            out_tick: 10,
            supply: 100,
        }),
    );
    let order_id = create.tx_id;
    records::add_balance(&mut state, &filler, &AssetId::Native, 1_000).unwrap();

    acceptor
        .accept_block(&AcceptedBlock {
            height: 1,
            timestamp: 1_000,
            txs: vec![issue, produce, create],
        })
        .unwrap();

    let pair = Pair {
        input: AssetId::Native,
        output: asset,
    };

    // Partial fill: 6 input at 2-per-tick buys 3 ticks of 10.
    let partial = run(
        &mut state,
        filler,
        b"fill-1",
        TypedAction::FillOrder(FillOrder {
            order: order_id,
            owner: producer,
            input: AssetId::Native,
            output: asset,
            value: 6,
        }),
    );
    assert!(partial.result.success);
    acceptor
        .accept_block(&AcceptedBlock {
            height: 2,
            timestamp: 2_000,
            txs: vec![partial],
        })
        .unwrap();

    let indexed = acceptor.book().best(&pair).unwrap();
    assert_eq!(indexed.remaining, 70);
    assert_eq!(records::get_balance(&state, &filler, &asset).unwrap(), 30);

    // Oversized fill clips to the 7 remaining ticks and exhausts the order,
    // which must drop out of the index in the same block.
    let exhausting = run(
        &mut state,
        filler,
        b"fill-2",
        TypedAction::FillOrder(FillOrder {
            order: order_id,
            owner: producer,
            input: AssetId::Native,
            output: asset,
            value: 40,
        }),
    );
    assert!(exhausting.result.success);
    acceptor
        .accept_block(&AcceptedBlock {
            height: 3,
            timestamp: 3_000,
            txs: vec![exhausting],
        })
        .unwrap();

    assert!(acceptor.book().best(&pair).is_none());
    assert!(acceptor.book().is_empty());
    assert!(records::get_order(&state, &order_id).unwrap().is_none());
    assert_eq!(records::get_balance(&state, &filler, &asset).unwrap(), 100);
    // The filler paid 6 + 14, the clipped surplus stayed put.
    assert_eq!(
        records::get_balance(&state, &filler, &AssetId::Native).unwrap(),
        980
    );
    assert_eq!(
        records::get_balance(&state, &producer, &AssetId::Native).unwrap(),
        20
    );
    assert_eq!(acceptor.metrics().fill_order.get(), 2);
}
