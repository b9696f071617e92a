//! End-to-end search scenarios: known endgames, tactical shots, and
//! cancellation behavior, driven through the public `Searcher` API.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use garnet_core::{Board, generate_legal_moves};
use garnet_engine::{MATE_BOUND, SearchControl, Searcher};

fn infinite_control() -> SearchControl {
    SearchControl::new_infinite(Arc::new(AtomicBool::new(false)))
}

#[test]
fn startpos_depth_one_reports_sane_line() {
    let board = Board::starting_position();
    let mut searcher = Searcher::new();
    let control = infinite_control();

    let mut reports = 0;
    let result = searcher.search(&board, &[], 1, &control, |report| {
        reports += 1;
        assert_eq!(report.depth, 1);
        assert!(!report.pv.is_empty());
        assert!(report.score.abs() < MATE_BOUND);
    });

    assert_eq!(reports, 1);
    let legal = generate_legal_moves(&board);
    assert!(legal.as_slice().contains(&result.best_move));
}

#[test]
fn kpk_win_holds_up_with_depth() {
    // Basic won king-and-pawn endgame: the score must stay positive as
    // the search deepens and the final verdict should be comfortable.
    let board: Board = "4k3/8/4K3/4P3/8/8/8/8 w - - 0 1".parse().unwrap();
    let mut searcher = Searcher::new();
    let control = infinite_control();

    let mut scores = Vec::new();
    let result = searcher.search(&board, &[], 10, &control, |report| {
        scores.push(report.score);
    });

    assert_eq!(scores.len(), 10);
    assert!(result.score > 0, "won KPK scored {}", result.score);
    // Deeper searches see the win at least as clearly as shallow ones.
    assert!(
        *scores.last().unwrap() >= scores[0],
        "score regressed from {} to {}",
        scores[0],
        scores.last().unwrap()
    );
}

#[test]
fn krk_finds_forced_mate() {
    // Rook and king versus bare king, mate available on the spot.
    let board: Board = "k7/8/1K6/8/8/8/8/7R w - - 0 1".parse().unwrap();
    let mut searcher = Searcher::new();
    let control = infinite_control();
    let result = searcher.search(&board, &[], 8, &control, |_| {});

    assert!(result.score > MATE_BOUND, "KRK scored {}", result.score);
    // The winning line delivers mate within a handful of plies.
    let mut board = board;
    let mut mated = false;
    for mv in &result.pv {
        board = board.make_move(*mv);
        if board.in_check() && generate_legal_moves(&board).is_empty() {
            mated = true;
            break;
        }
    }
    assert!(mated, "PV {:?} does not end in checkmate", result.pv);
}

#[test]
fn deep_middlegame_search_reports_legal_best_move() {
    // Kiwipete: dense tactics, every special move type available.
    let board: Board = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        .parse()
        .unwrap();
    let mut searcher = Searcher::new();
    let control = infinite_control();
    let result = searcher.search(&board, &[], 5, &control, |_| {});

    let legal = generate_legal_moves(&board);
    assert!(legal.as_slice().contains(&result.best_move));
    assert!(result.depth == 5);
    assert!(result.nodes > 0);
}

#[test]
fn search_is_reproducible_from_a_fresh_searcher() {
    // Two fresh searchers on the same position agree: the table is
    // cleared per search, so no state leaks between runs.
    let board: Board = "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4"
        .parse()
        .unwrap();
    let control = infinite_control();

    let mut first = Searcher::new();
    let a = first.search(&board, &[], 5, &control, |_| {});
    let mut second = Searcher::new();
    let b = second.search(&board, &[], 5, &control, |_| {});

    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.nodes, b.nodes);
}

#[test]
fn reused_searcher_also_reproduces_results() {
    // The same searcher run twice must behave like a fresh one: a new
    // Search call starts from zeroed tables.
    let board: Board = "rnbqkb1r/pp1p1ppp/4pn2/2p5/2PP4/5N2/PP2PPPP/RNBQKB1R w KQkq - 0 4"
        .parse()
        .unwrap();
    let control = infinite_control();

    let mut searcher = Searcher::new();
    let a = searcher.search(&board, &[], 4, &control, |_| {});
    let b = searcher.search(&board, &[], 4, &control, |_| {});

    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.nodes, b.nodes);
}

#[test]
fn pre_stopped_search_never_reports_an_iteration() {
    let board = Board::starting_position();
    let mut searcher = Searcher::new();
    let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(true)));

    let mut fired = false;
    let result = searcher.search(&board, &[], 30, &control, |_| {
        fired = true;
    });

    assert!(!fired, "stopped search must not report iterations");
    assert_eq!(result.depth, 0);
    assert_eq!(result.score, 0);
}
