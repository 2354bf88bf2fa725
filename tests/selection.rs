//! Integration tests for end-to-end team selection

use rustc_hash::FxHashSet;
use testresult::TestResult;

use roster::prelude::*;

fn item(id: ItemId, name: &str, category: &str, price: f64, rating: f64) -> Item {
    Item {
        id,
        name: name.to_owned(),
        category: category.to_owned(),
        price,
        rating,
    }
}

/// Five items across five distinct categories, prices 10..=14.
fn five_category_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(vec![
        item(1, "Anchor", "keeper", 10.0, 4.0),
        item(2, "Bulwark", "defence", 11.0, 4.2),
        item(3, "Conductor", "midfield", 12.0, 4.5),
        item(4, "Dynamo", "winger", 13.0, 3.9),
        item(5, "Edge", "striker", 14.0, 4.7),
    ])
}

#[test]
fn ample_budget_selects_the_only_feasible_full_team() -> TestResult {
    let catalog = five_category_catalog()?;

    // One item per category and team_size = 5: taking all five is the only
    // feasible assignment, and it costs 60 <= 100.
    let selection = TeamSelector::new().select(&catalog, &SelectionRequest::new(100.0))?;

    let ids: FxHashSet<ItemId> = selection.items().iter().map(|item| item.id).collect();

    assert_eq!(ids, FxHashSet::from_iter([1, 2, 3, 4, 5]));

    Ok(())
}

#[test]
fn insufficient_budget_is_reported_as_infeasible() -> TestResult {
    let catalog = five_category_catalog()?;

    // The five cheapest prices already sum to 60 > 30.
    let selection = TeamSelector::new().select(&catalog, &SelectionRequest::new(30.0))?;

    assert_eq!(selection, Selection::Infeasible);
    assert!(selection.items().is_empty());

    Ok(())
}

#[test]
fn one_item_per_category_and_the_better_one_wins() -> TestResult {
    // Three categories, two items each. The first item of every category has
    // both the better rating and the lower price, so it scores strictly
    // higher and must be the one selected.
    let catalog = Catalog::new(vec![
        item(1, "Anchor", "keeper", 10.0, 4.8),
        item(2, "Backup", "keeper", 12.0, 3.1),
        item(3, "Conductor", "midfield", 15.0, 4.6),
        item(4, "Carrier", "midfield", 18.0, 3.0),
        item(5, "Edge", "striker", 20.0, 4.9),
        item(6, "Fringe", "striker", 25.0, 3.4),
    ])?;

    let request = SelectionRequest::new(1000.0).with_team_size(3);
    let selection = TeamSelector::new().select(&catalog, &request)?;

    let ids: FxHashSet<ItemId> = selection.items().iter().map(|item| item.id).collect();

    assert_eq!(ids, FxHashSet::from_iter([1, 3, 5]));

    Ok(())
}

#[test]
fn team_size_beyond_categories_is_rejected_before_solving() -> TestResult {
    let catalog = five_category_catalog()?;

    let request = SelectionRequest::new(100.0).with_team_size(6);
    let result = TeamSelector::new().select(&catalog, &request);

    assert!(
        matches!(
            result,
            Err(SelectionError::Validation(
                ValidationError::TeamSizeExceedsCategories {
                    team_size: 6,
                    categories: 5,
                }
            ))
        ),
        "expected a validation error, got {result:?}"
    );

    Ok(())
}

#[test]
fn non_positive_budget_is_rejected_before_solving() -> TestResult {
    let catalog = five_category_catalog()?;

    let result = TeamSelector::new().select(&catalog, &SelectionRequest::new(-1.0));

    assert!(
        matches!(
            result,
            Err(SelectionError::Validation(
                ValidationError::NonPositiveBudget(_)
            ))
        ),
        "expected a validation error, got {result:?}"
    );

    Ok(())
}

/// A mixed catalog where the budget actually bites: every result must still
/// satisfy all three constraint families.
fn mixed_catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(vec![
        item(1, "Anchor", "keeper", 30.0, 4.9),
        item(2, "Backup", "keeper", 12.0, 3.8),
        item(3, "Bulwark", "defence", 25.0, 4.7),
        item(4, "Brace", "defence", 14.0, 3.9),
        item(5, "Conductor", "midfield", 28.0, 4.8),
        item(6, "Carrier", "midfield", 11.0, 3.5),
        item(7, "Edge", "striker", 32.0, 5.0),
        item(8, "Fringe", "striker", 13.0, 3.6),
    ])
}

#[test]
fn selected_teams_respect_budget_and_category_uniqueness() -> TestResult {
    let catalog = mixed_catalog()?;

    for budget in [45.0, 60.0, 80.0, 120.0] {
        let request = SelectionRequest::new(budget).with_team_size(3);
        let selection = TeamSelector::new().select(&catalog, &request)?;

        let Selection::Team { items } = selection else {
            panic!("budget {budget} admits the three cheapest categories");
        };

        assert_eq!(items.len(), 3, "team size must be exact, never partial");

        let total: f64 = items.iter().map(|item| item.price).sum();
        assert!(total <= budget, "total {total} exceeds budget {budget}");

        let categories: FxHashSet<&str> =
            items.iter().map(|item| item.category.as_str()).collect();
        assert_eq!(categories.len(), items.len(), "categories must be unique");
    }

    Ok(())
}

/// Brute force every feasible subset of the requested size and return the
/// best total score.
fn brute_force_best_score(
    catalog: &Catalog,
    weights: Weights,
    budget: f64,
    team_size: usize,
) -> Option<f64> {
    let scores = value_scores(catalog, weights);
    let items = catalog.items();

    let mut best: Option<f64> = None;
    let mut chosen: Vec<&Item> = Vec::with_capacity(team_size);

    fn recurse<'a>(
        items: &'a [Item],
        start: usize,
        team_size: usize,
        budget: f64,
        scores: &rustc_hash::FxHashMap<ItemId, f64>,
        chosen: &mut Vec<&'a Item>,
        best: &mut Option<f64>,
    ) {
        if chosen.len() == team_size {
            let total_price: f64 = chosen.iter().map(|item| item.price).sum();
            if total_price > budget {
                return;
            }

            let mut categories: FxHashSet<&str> = FxHashSet::default();
            if !chosen
                .iter()
                .all(|item| categories.insert(item.category.as_str()))
            {
                return;
            }

            let total_score: f64 = chosen
                .iter()
                .map(|item| scores.get(&item.id).copied().unwrap_or(f64::NAN))
                .sum();

            if best.is_none_or(|current| total_score > current) {
                *best = Some(total_score);
            }

            return;
        }

        for (offset, item) in items.iter().enumerate().skip(start) {
            chosen.push(item);
            recurse(items, offset + 1, team_size, budget, scores, chosen, best);
            chosen.pop();
        }
    }

    recurse(items, 0, team_size, budget, &scores, &mut chosen, &mut best);

    best
}

#[test]
fn milp_selection_is_optimal_against_brute_force() -> TestResult {
    let catalog = mixed_catalog()?;
    let weights = Weights::default();

    for budget in [40.0, 55.0, 70.0, 200.0] {
        let request = SelectionRequest::new(budget).with_team_size(3);
        let selection = TeamSelector::new().select(&catalog, &request)?;

        let expected = brute_force_best_score(&catalog, weights, budget, 3);

        match (selection, expected) {
            (Selection::Team { items }, Some(best)) => {
                let scores = value_scores(&catalog, weights);
                let total: f64 = items
                    .iter()
                    .map(|item| scores.get(&item.id).copied().unwrap_or(f64::NAN))
                    .sum();

                assert!(
                    (total - best).abs() < 1e-9,
                    "budget {budget}: solver total {total} != brute force {best}"
                );
            }
            (Selection::Infeasible, None) => {}
            (selection, expected) => {
                panic!("budget {budget}: solver said {selection:?}, brute force said {expected:?}")
            }
        }
    }

    Ok(())
}

#[test]
fn both_backends_agree_on_the_optimal_score() -> TestResult {
    let catalog = mixed_catalog()?;
    let weights = Weights::default();
    let scores = value_scores(&catalog, weights);

    let total = |selection: &Selection| -> f64 {
        selection
            .items()
            .iter()
            .map(|item| scores.get(&item.id).copied().unwrap_or(f64::NAN))
            .sum()
    };

    for budget in [45.0, 60.0, 90.0] {
        let request = SelectionRequest::new(budget).with_team_size(3);

        let milp = TeamSelector::new().select(&catalog, &request)?;
        let exact = TeamSelector::with_solver(BranchBoundSolver).select(&catalog, &request)?;

        assert_eq!(milp.is_team(), exact.is_team(), "backends disagree on feasibility");
        assert!(
            (total(&milp) - total(&exact)).abs() < 1e-9,
            "budget {budget}: backends disagree on the optimal score"
        );
    }

    Ok(())
}

#[test]
fn custom_weights_change_the_winner() -> TestResult {
    // Two candidates per slot: one premium (better rating, higher price) and
    // one economy option. All weight on price must flip the choice towards
    // the cheaper item; all weight on rating towards the better-rated one.
    let catalog = Catalog::new(vec![
        item(1, "Premium", "keeper", 40.0, 5.0),
        item(2, "Economy", "keeper", 10.0, 3.0),
    ])?;

    let request = SelectionRequest::new(100.0).with_team_size(1);

    let by_rating = TeamSelector::new()
        .with_weights(Weights::new(1.0, 0.0)?)
        .select(&catalog, &request)?;
    let by_price = TeamSelector::new()
        .with_weights(Weights::new(0.0, 1.0)?)
        .select(&catalog, &request)?;

    assert_eq!(by_rating.items().iter().map(|item| item.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(by_price.items().iter().map(|item| item.id).collect::<Vec<_>>(), vec![2]);

    Ok(())
}

#[test]
fn selection_serializes_to_the_boundary_shape() -> TestResult {
    let catalog = Catalog::new(vec![item(1, "Anchor", "keeper", 10.0, 4.0)])?;

    let selection =
        TeamSelector::new().select(&catalog, &SelectionRequest::new(20.0).with_team_size(1))?;

    let json = serde_json::to_value(&selection)?;

    assert_eq!(json["outcome"], "team");
    assert_eq!(json["items"][0]["id"], 1);
    assert_eq!(json["items"][0]["category"], "keeper");

    Ok(())
}
