//! Recipe query builder using SeaQuery.
//!
//! Generates PostgreSQL for compiled recipe queries with support for:
//! - Card projection (author, counts, facet badges as JSON)
//! - Relevance scoring for text search
//! - Deterministic ordering with an id tie-break
//! - Pagination

use sea_query::{Alias, Asterisk, Expr, JoinType, Order, PostgresQueryBuilder, Query};

use crate::condition::sql::{RECIPE_TABLE, score_expr, to_expr};
use crate::condition::{CompiledQuery, Condition, RecipeOrder};

const INGREDIENT_COUNT: &str =
    "(SELECT COUNT(*) FROM recipe_ingredient ri WHERE ri.recipe_id = recipe.id)";

const STEP_COUNT: &str = "(SELECT COUNT(*) FROM recipe_step rs WHERE rs.recipe_id = recipe.id)";

const CUISINE_JSON: &str = "(SELECT json_build_object('id', c.id, 'name', c.name, 'color', c.color, 'flag', c.flag) \
     FROM cuisine c WHERE c.id = recipe.cuisine_id)";

const TAGS_JSON: &str = "COALESCE((SELECT json_agg(json_build_object('id', t.id, 'name', t.name, 'color', t.color, 'icon', t.icon) ORDER BY t.name) \
     FROM recipe_tag t WHERE t.id = ANY(recipe.tag_ids)), '[]'::json)";

const MEALS_JSON: &str = "COALESCE((SELECT json_agg(json_build_object('id', m.id, 'name', m.name, 'color', m.color) ORDER BY m.name) \
     FROM meal m WHERE m.id = ANY(recipe.meal_ids)), '[]'::json)";

/// Query builder for recipe pages.
pub struct RecipeQueryBuilder<'a> {
    query: &'a CompiledQuery,
}

impl<'a> RecipeQueryBuilder<'a> {
    pub fn new(query: &'a CompiledQuery) -> Self {
        Self { query }
    }

    /// Build the page SELECT.
    pub fn build(&self, limit: u32, offset: u64) -> String {
        let recipe = || Alias::new(RECIPE_TABLE);
        let mut select = Query::select();

        // SELECT card fields
        for column in [
            "id",
            "name",
            "created_at",
            "image_blur_hash",
            "cooking_time_minutes",
        ] {
            select.column((recipe(), Alias::new(column)));
        }
        select.expr_as(
            Expr::col((Alias::new("author"), Alias::new("username"))),
            Alias::new("author_username"),
        );
        select.expr_as(Expr::cust(INGREDIENT_COUNT), Alias::new("ingredient_count"));
        select.expr_as(Expr::cust(STEP_COUNT), Alias::new("step_count"));
        select.expr_as(Expr::cust(CUISINE_JSON), Alias::new("cuisine"));
        select.expr_as(Expr::cust(TAGS_JSON), Alias::new("tags"));
        select.expr_as(Expr::cust(MEALS_JSON), Alias::new("meals"));
        if let RecipeOrder::Relevance { term, language } = &self.query.order {
            select.expr_as(score_expr(term, *language), Alias::new("score"));
        }

        // FROM recipe LEFT JOIN app_user author
        select.from(recipe());
        select.join_as(
            JoinType::LeftJoin,
            Alias::new("app_user"),
            Alias::new("author"),
            Expr::col((Alias::new("author"), Alias::new("id")))
                .equals((recipe(), Alias::new("author_id"))),
        );

        // WHERE
        select.and_where(to_expr(&self.query.condition));

        // ORDER BY [score DESC,] created_at DESC, id DESC
        if let RecipeOrder::Relevance { term, language } = &self.query.order {
            select.order_by_expr(score_expr(term, *language), Order::Desc);
        }
        select.order_by((recipe(), Alias::new("created_at")), Order::Desc);
        select.order_by((recipe(), Alias::new("id")), Order::Desc);

        // LIMIT/OFFSET
        select.limit(u64::from(limit));
        select.offset(offset);

        select.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query over the same condition, ignoring pagination.
    pub fn build_count(condition: &Condition) -> String {
        let mut select = Query::select();
        select.expr(Expr::col(Asterisk).count());
        select.from(Alias::new(RECIPE_TABLE));
        select.and_where(to_expr(condition));
        select.to_string(PostgresQueryBuilder)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::condition::{QueryScope, compile};
    use crate::filter::{BoolOperator, FilterConditions, FilterGroup};
    use crate::models::Language;
    use chrono::Utc;
    use uuid::Uuid;

    fn compiled(search: &str) -> CompiledQuery {
        let mut conditions = FilterConditions {
            search_term: search.to_string(),
            ..Default::default()
        };
        conditions.include.tags = FilterGroup::new(BoolOperator::And, [Uuid::now_v7()]);
        let scope = QueryScope::new(Uuid::now_v7(), Language::En);
        compile(&conditions, &scope, Utc::now()).unwrap()
    }

    #[test]
    fn page_query_orders_newest_with_id_tiebreak() {
        let query = compiled("");
        let sql = RecipeQueryBuilder::new(&query).build(9, 18);

        assert!(sql.contains("SELECT"));
        assert!(
            sql.contains(r#"ORDER BY "recipe"."created_at" DESC, "recipe"."id" DESC"#),
            "{sql}"
        );
        assert!(sql.contains("LIMIT 9"));
        assert!(sql.contains("OFFSET 18"));
        assert!(!sql.contains("ts_rank"));
    }

    #[test]
    fn search_query_orders_by_score_first() {
        let query = compiled("pasta");
        let sql = RecipeQueryBuilder::new(&query).build(5, 0);

        assert!(sql.contains(r#"AS "score""#), "{sql}");
        let score_pos = sql.rfind("ts_rank").unwrap();
        let created_pos = sql.rfind(r#""recipe"."created_at" DESC"#).unwrap();
        assert!(score_pos < created_pos);
        assert!(sql.contains("plainto_tsquery('english', 'pasta')"));
    }

    #[test]
    fn page_query_projects_card_fields() {
        let query = compiled("");
        let sql = RecipeQueryBuilder::new(&query).build(9, 0);

        assert!(sql.contains(r#"AS "author_username""#));
        assert!(sql.contains(r#"AS "ingredient_count""#));
        assert!(sql.contains(r#"AS "step_count""#));
        assert!(sql.contains("LEFT JOIN \"app_user\" AS \"author\""), "{sql}");
        assert!(sql.contains("recipe.tag_ids @> ARRAY["));
    }

    #[test]
    fn count_query_has_no_paging() {
        let query = compiled("");
        let sql = RecipeQueryBuilder::build_count(&query.condition);

        assert!(sql.starts_with("SELECT COUNT(*)"), "{sql}");
        assert!(sql.contains("\"household_id\""));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("ORDER BY"));
    }
}
