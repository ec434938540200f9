use num_rational::Rational64;
use proptest::prelude::*;
use sat_puzzles::csp::{CheckResult, EngineConfig, Session, all_different, eq};
use sat_puzzles::error::{EngineError, PuzzleError};
use sat_puzzles::extract::Outcome;
use sat_puzzles::queens::Queens;
use sat_puzzles::resources::{Allocation, ResourcePuzzle};
use sat_puzzles::sudoku::{Board, EXAMPLE_FOUR, EXAMPLE_NINE, Size, Sudoku};
use std::time::Duration;

fn pigeonhole(session: &mut Session, pigeons: usize) {
    let holes = i64::try_from(pigeons).unwrap() - 1;
    let vars = (0..pigeons)
        .map(|p| session.declare_integer(format!("p{p}"), 1, holes).unwrap())
        .collect::<Vec<_>>();
    session.assert(all_different(vars)).unwrap();
}

#[test]
fn resource_answer_is_the_known_triple() {
    let puzzle = ResourcePuzzle::default();
    let allocation = puzzle.solve().unwrap().solved().unwrap();
    assert!(allocation.check(&puzzle));
    assert_eq!(allocation.counts(), vec![3, 41, 56]);
    assert_eq!(
        allocation.iter().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["dogs", "cats", "mice"]
    );
}

#[test]
fn sudoku_example_is_solved_and_keeps_givens() {
    let givens = Board::from(EXAMPLE_NINE);
    let solution = Sudoku::new(givens.clone())
        .unwrap()
        .solve()
        .unwrap()
        .solved()
        .unwrap();
    assert!(solution.is_solution_of(&givens));
    for ((r, c), v) in givens.givens() {
        assert_eq!(solution.get(r, c), Some(v));
    }
}

#[test]
fn solving_twice_gives_valid_answers_both_times() {
    let sudoku = Sudoku::new(EXAMPLE_NINE).unwrap();
    for _ in 0..2 {
        let solution = sudoku.solve().unwrap().solved().unwrap();
        assert!(solution.is_solution_of(sudoku.board()));
    }
    let queens = Queens::default();
    for _ in 0..2 {
        assert!(queens.solve().unwrap().solved().unwrap().is_valid());
    }
}

#[test]
fn out_of_range_given_is_rejected_before_solving() {
    let mut board = EXAMPLE_NINE;
    board[4][4] = 10;
    assert!(matches!(
        Sudoku::new(board),
        Err(PuzzleError::GivenOutOfRange { value: 10, .. })
    ));
    assert!(matches!(
        Sudoku::new_unchecked(board),
        Err(PuzzleError::GivenOutOfRange { value: 10, .. })
    ));
}

#[test]
fn duplicate_given_is_rejected_or_infeasible() {
    let mut board = EXAMPLE_NINE;
    board[0][0] = 3;
    assert!(matches!(
        Sudoku::new(board),
        Err(PuzzleError::DuplicateGiven { value: 3, .. })
    ));
    let outcome = Sudoku::new_unchecked(board).unwrap().solve().unwrap();
    assert_eq!(outcome, Outcome::Infeasible);
}

#[test]
fn blank_sudoku_is_satisfiable() {
    for size in [Size::Four, Size::Nine] {
        let blank = Board::blank(size);
        let solution = Sudoku::new(blank.clone())
            .unwrap()
            .solve()
            .unwrap()
            .solved()
            .unwrap();
        assert!(solution.is_solution_of(&blank));
    }
}

#[test]
fn parsed_board_matches_constant() {
    let text = "....94.3. ...51...7 .89....4. ......2.8 .6.2.1.5. 1.2...... .7....52. 9...65... .4.97....";
    assert_eq!(text.parse::<Board>().unwrap(), Board::from(EXAMPLE_NINE));
}

#[test]
fn tiny_conflict_budget_is_unknown() {
    let mut session = Session::new(EngineConfig::default().with_max_conflicts(Some(1)));
    pigeonhole(&mut session, 7);
    assert!(matches!(session.check().unwrap(), CheckResult::Unknown(_)));
    assert_eq!(session.model(), Err(EngineError::NoModel));

    let mut session = Session::default();
    pigeonhole(&mut session, 5);
    assert_eq!(session.check().unwrap(), CheckResult::Unsatisfiable);
}

#[test]
fn expired_timeout_is_unknown() {
    let config = EngineConfig::default().with_timeout(Some(Duration::ZERO));
    let mut session = Session::new(config);
    pigeonhole(&mut session, 8);
    assert!(matches!(session.check().unwrap(), CheckResult::Unknown(_)));
}

#[test]
fn model_before_check_is_missing() {
    let mut session = Session::default();
    let x = session.declare_integer("x", 0, 3).unwrap();
    session.assert(eq(x, 2)).unwrap();
    assert_eq!(session.model(), Err(EngineError::NoModel));
    assert_eq!(session.check().unwrap(), CheckResult::Satisfiable);
    assert_eq!(session.model().unwrap().evaluate(x), 2);
}

#[test]
fn indeterminate_is_not_infeasible() {
    let config = EngineConfig::default().with_max_conflicts(Some(1));
    let outcome = Queens::new(10).unwrap().solve_with(config).unwrap();
    assert!(!outcome.is_infeasible());
}

#[test]
fn sudoku_dimacs_export() {
    let cnf = Sudoku::new(EXAMPLE_FOUR).unwrap().to_cnf().unwrap();
    let dimacs = cnf.to_string();
    let header = dimacs.lines().next().unwrap();
    assert!(header.starts_with("p cnf "));
    let clauses: usize = header.split_whitespace().nth(3).unwrap().parse().unwrap();
    assert_eq!(clauses, dimacs.lines().count() - 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn queens_placements_are_valid(n in 1usize..=10) {
        let outcome = Queens::new(n).unwrap().solve().unwrap();
        if n == 2 || n == 3 {
            prop_assert_eq!(outcome, Outcome::Infeasible);
        } else {
            let placement = outcome.solved().unwrap();
            prop_assert!(placement.is_valid());
            prop_assert_eq!(placement.positions().len(), n);
        }
    }

    #[test]
    fn allocation_check_matches_arithmetic(
        dogs in 0i64..=20,
        cats in 0i64..=100,
        mice in 0i64..=100,
    ) {
        let allocation = Allocation::new(vec![
            ("dogs".to_string(), dogs),
            ("cats".to_string(), cats),
            ("mice".to_string(), mice),
        ]);
        let expected = dogs >= 1
            && cats >= 1
            && mice >= 1
            && dogs + cats + mice == 100
            && 60 * dogs + 4 * cats + mice == 400;
        prop_assert_eq!(allocation.check(&ResourcePuzzle::default()), expected);
    }

    #[test]
    fn linear_expressions_evaluate_exactly(
        a in -20i64..=20,
        b in -20i64..=20,
        num in -9i64..=9,
        den in 1i64..=6,
    ) {
        let mut session = Session::default();
        let x = session.declare_integer("x", -20, 20).unwrap();
        let y = session.declare_integer("y", -20, 20).unwrap();
        session.assert(eq(x, a)).unwrap();
        session.assert(eq(y, b)).unwrap();
        prop_assert_eq!(session.check().unwrap(), CheckResult::Satisfiable);

        let coef = Rational64::new(num, den);
        let expr = x * coef - y * 3 + 7;
        let expected = coef * a - Rational64::from_integer(3 * b - 7);
        prop_assert_eq!(session.model().unwrap().eval_expr(&expr), expected);
    }

    #[test]
    fn relabelled_sudoku_still_solves(
        labels in Just(vec![1usize, 2, 3, 4]).prop_shuffle(),
    ) {
        let relabelled = EXAMPLE_FOUR.map(|row| row.map(|v| if v == 0 { 0 } else { labels[v - 1] }));
        let givens = Board::from(relabelled);
        let solution = Sudoku::new(givens.clone()).unwrap().solve().unwrap().solved().unwrap();
        prop_assert!(solution.is_solution_of(&givens));
    }
}
