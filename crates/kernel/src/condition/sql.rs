//! PostgreSQL rendering of conditions via SeaQuery.
//!
//! Maps the expression tree onto the `recipe` table:
//! - id fields: `household_id`, `cuisine_id`
//! - set fields: `meal_ids` / `tag_ids` arrays, ingredient ids projected from
//!   `recipe_ingredient`
//! - text match: `to_tsvector(<config>, name) @@ plainto_tsquery(<config>, term)`

use sea_query::{Alias, Cond, Expr, SimpleExpr};
use uuid::Uuid;

use super::ast::{Condition, IdField, SetField};
use crate::models::Language;

/// Base table the rendered expressions refer to.
pub const RECIPE_TABLE: &str = "recipe";

/// Render a condition as a SeaQuery expression.
pub fn to_expr(condition: &Condition) -> SimpleExpr {
    match condition {
        Condition::And(terms) => {
            if terms.is_empty() {
                return Expr::cust("TRUE");
            }
            let mut cond = Cond::all();
            for term in terms {
                cond = cond.add(to_expr(term));
            }
            cond.into()
        }
        Condition::Or(terms) => {
            if terms.is_empty() {
                return Expr::cust("FALSE");
            }
            let mut cond = Cond::any();
            for term in terms {
                cond = cond.add(to_expr(term));
            }
            cond.into()
        }
        Condition::Not(inner) => Cond::all().add(to_expr(inner)).not().into(),
        Condition::Equals(field, id) => Expr::col(id_column(*field)).eq(*id),
        Condition::In(field, ids) => {
            if ids.is_empty() {
                return Expr::cust("FALSE");
            }
            // NULL cuisine must read as "not in", so NOT(...) keeps the row
            Cond::all()
                .add(Expr::col(id_column(*field)).is_not_null())
                .add(Expr::col(id_column(*field)).is_in(ids.iter().copied()))
                .into()
        }
        Condition::CreatedAtOrBefore(at) => {
            Expr::col((Alias::new(RECIPE_TABLE), Alias::new("created_at"))).lte(*at)
        }
        Condition::ContainsAll(field, ids) => {
            Expr::cust(format!("{} @> {}", set_expr(*field), uuid_array(ids)))
        }
        Condition::ContainsAny(field, ids) => {
            Expr::cust(format!("{} && {}", set_expr(*field), uuid_array(ids)))
        }
        Condition::Matches { term, language } => Expr::cust_with_values(
            format!(
                "{} @@ plainto_tsquery('{}', $1)",
                name_vector(*language),
                language.search_config()
            ),
            [term.clone()],
        ),
    }
}

/// Relevance score expression for a search term.
pub fn score_expr(term: &str, language: Language) -> SimpleExpr {
    Expr::cust_with_values(
        format!(
            "ts_rank({}, plainto_tsquery('{}', $1))",
            name_vector(language),
            language.search_config()
        ),
        [term.to_string()],
    )
}

fn name_vector(language: Language) -> String {
    format!(
        "to_tsvector('{}', {RECIPE_TABLE}.name)",
        language.search_config()
    )
}

fn id_column(field: IdField) -> (Alias, Alias) {
    let column = match field {
        IdField::Household => "household_id",
        IdField::Cuisine => "cuisine_id",
    };
    (Alias::new(RECIPE_TABLE), Alias::new(column))
}

fn set_expr(field: SetField) -> String {
    match field {
        SetField::Meals => format!("{RECIPE_TABLE}.meal_ids"),
        SetField::Tags => format!("{RECIPE_TABLE}.tag_ids"),
        SetField::Ingredients => format!(
            "ARRAY(SELECT ri.ingredient_id FROM recipe_ingredient ri WHERE ri.recipe_id = {RECIPE_TABLE}.id)"
        ),
    }
}

/// `ARRAY['…', '…']::uuid[]`. UUIDs render as hex and dashes only, so inline
/// literals are safe.
fn uuid_array(ids: &[Uuid]) -> String {
    let list: Vec<String> = ids.iter().map(|u| format!("'{u}'")).collect();
    format!("ARRAY[{}]::uuid[]", list.join(", "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_query::{PostgresQueryBuilder, Query};

    fn render(condition: &Condition) -> String {
        Query::select()
            .expr(Expr::cust("1"))
            .from(Alias::new(RECIPE_TABLE))
            .and_where(to_expr(condition))
            .to_string(PostgresQueryBuilder)
    }

    #[test]
    fn household_scope_renders_equality() {
        let id = Uuid::now_v7();
        let sql = render(&Condition::Equals(IdField::Household, id));
        assert!(sql.contains(r#""recipe"."household_id" = "#), "{sql}");
        assert!(sql.contains(&id.to_string()));
    }

    #[test]
    fn set_operators_use_array_containment() {
        let id = Uuid::now_v7();
        let all = render(&Condition::ContainsAll(SetField::Tags, vec![id]));
        assert!(all.contains("recipe.tag_ids @> ARRAY["), "{all}");

        let any = render(&Condition::ContainsAny(SetField::Meals, vec![id]));
        assert!(any.contains("recipe.meal_ids && ARRAY["), "{any}");
        assert!(any.contains("]::uuid[]"));
    }

    #[test]
    fn ingredients_project_from_join_table() {
        let sql = render(&Condition::ContainsAny(
            SetField::Ingredients,
            vec![Uuid::now_v7()],
        ));
        assert!(sql.contains("FROM recipe_ingredient ri"), "{sql}");
    }

    #[test]
    fn negation_wraps_inner_expression() {
        let sql = render(&Condition::In(IdField::Cuisine, vec![Uuid::now_v7()]).negate());
        assert!(sql.contains("NOT"), "{sql}");
        assert!(sql.contains(r#""cuisine_id" IN"#), "{sql}");
        assert!(sql.contains(r#""cuisine_id" IS NOT NULL"#), "{sql}");
    }

    #[test]
    fn search_uses_household_language() {
        let sql = render(&Condition::Matches {
            term: "paprikás".to_string(),
            language: Language::Hu,
        });
        assert!(sql.contains("to_tsvector('hungarian', recipe.name)"), "{sql}");
        assert!(sql.contains("plainto_tsquery('hungarian', 'paprikás')"), "{sql}");
    }

    #[test]
    fn search_term_is_escaped() {
        let sql = render(&Condition::Matches {
            term: "it's".to_string(),
            language: Language::En,
        });
        assert!(!sql.contains("'it's'"), "{sql}");
    }

    #[test]
    fn conjunction_joins_terms() {
        let sql = render(&Condition::And(vec![
            Condition::Equals(IdField::Household, Uuid::now_v7()),
            Condition::CreatedAtOrBefore(Utc::now()),
        ]));
        assert!(sql.contains(" AND "), "{sql}");
        assert!(sql.contains(r#""recipe"."created_at" <= "#), "{sql}");
    }

    #[test]
    fn empty_groups_render_constants() {
        assert!(render(&Condition::And(vec![])).contains("TRUE"));
        assert!(render(&Condition::Or(vec![])).contains("FALSE"));
    }
}
