//! Search filter composition / 搜索条件组合
//!
//! Turns the optional search parameters into one conjunctive query:
//! - every supplied parameter becomes exactly one [`Clause`]
//! - clauses are ANDed together into a [`RecipeFilter`]
//! - no clauses at all means a plain enumeration ([`RecipeQuery::All`])
//!
//! Results are always ordered by `name` ascending, whichever store runs them.
//! A clause knows how to test a [`Recipe`] in memory and how to render itself
//! as a bound SQL predicate, so every store shares the same matching rules.

use serde::{de, Deserialize, Deserializer};
use sqlx::{QueryBuilder, Sqlite};
use std::fmt;
use std::str::FromStr;

use crate::models::Recipe;

/// Search parameters accepted by `GET /v1/recipe` / 搜索参数
///
/// Unknown query keys are ignored by serde and never reach the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub servings: Option<i64>,
    #[serde(default)]
    pub exclude: Option<String>,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// `servings=` with no value is absent, anything else must parse / 空值视为未提供
fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Text columns a substring clause can target / 可做子串匹配的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Category,
    Instructions,
}

impl TextField {
    fn value(self, recipe: &Recipe) -> &str {
        match self {
            TextField::Name => &recipe.name,
            TextField::Category => &recipe.category,
            TextField::Instructions => &recipe.instructions,
        }
    }

    fn column(self) -> &'static str {
        match self {
            TextField::Name => "name",
            TextField::Category => "category",
            TextField::Instructions => "instructions",
        }
    }

    /// Column holding the lowercased value, written by the store on save
    fn lower_column(self) -> Option<&'static str> {
        match self {
            TextField::Category => Some("category_lower"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

/// One field comparison / 单个谓词条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Field contains `needle`. For insensitive matching the needle is already lowercased.
    Contains {
        field: TextField,
        needle: String,
        case: CaseSensitivity,
    },
    ServingsEq(i64),
    /// At least one ingredient contains the needle
    AnyIngredient(String),
    /// No ingredient contains the needle
    NoIngredient(String),
}

impl Clause {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Clause::Contains { field, needle, case: CaseSensitivity::Sensitive } => {
                field.value(recipe).contains(needle.as_str())
            }
            Clause::Contains { field, needle, case: CaseSensitivity::Insensitive } => {
                field.value(recipe).to_lowercase().contains(needle.as_str())
            }
            Clause::ServingsEq(n) => recipe.servings == *n,
            Clause::AnyIngredient(needle) => recipe.ingredients.iter().any(|i| i.contains(needle.as_str())),
            Clause::NoIngredient(needle) => !recipe.ingredients.iter().any(|i| i.contains(needle.as_str())),
        }
    }

    /// Render as a SQL predicate over the `recipes` table. `instr` keeps the
    /// match literal, unlike `LIKE` which treats `%` and `_` as wildcards.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Clause::Contains { field, needle, case } => {
                qb.push("instr(");
                match (case, field.lower_column()) {
                    (CaseSensitivity::Sensitive, _) => {
                        qb.push(field.column());
                    }
                    (CaseSensitivity::Insensitive, Some(lower)) => {
                        qb.push(lower);
                    }
                    // SQLite lower() folds ASCII only
                    (CaseSensitivity::Insensitive, None) => {
                        qb.push("lower(").push(field.column()).push(")");
                    }
                }
                qb.push(", ").push_bind(needle.clone()).push(") > 0");
            }
            Clause::ServingsEq(n) => {
                qb.push("servings = ").push_bind(*n);
            }
            Clause::AnyIngredient(needle) => {
                qb.push("EXISTS (SELECT 1 FROM json_each(recipes.ingredients) WHERE instr(json_each.value, ")
                    .push_bind(needle.clone())
                    .push(") > 0)");
            }
            Clause::NoIngredient(needle) => {
                qb.push("NOT EXISTS (SELECT 1 FROM json_each(recipes.ingredients) WHERE instr(json_each.value, ")
                    .push_bind(needle.clone())
                    .push(") > 0)");
            }
        }
    }
}

/// Conjunction of clauses, never empty / 条件合取
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    clauses: Vec<Clause>,
}

impl RecipeFilter {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.clauses.iter().all(|c| c.matches(recipe))
    }

    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                qb.push(" AND ");
            }
            clause.push_sql(qb);
        }
    }
}

/// What the store is asked to run, always sorted by name / 查询请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeQuery {
    All,
    Matching(RecipeFilter),
}

impl RecipeQuery {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            RecipeQuery::All => true,
            RecipeQuery::Matching(filter) => filter.matches(recipe),
        }
    }
}

/// Accumulates clauses, skipping absent or empty parameters / 条件构建器
#[derive(Debug, Default)]
pub struct FilterBuilder {
    clauses: Vec<Clause>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(mut self, field: TextField, needle: Option<&str>, case: CaseSensitivity) -> Self {
        if let Some(needle) = present(needle) {
            let needle = match case {
                CaseSensitivity::Sensitive => needle.to_string(),
                CaseSensitivity::Insensitive => needle.to_lowercase(),
            };
            self.clauses.push(Clause::Contains { field, needle, case });
        }
        self
    }

    pub fn servings(mut self, servings: Option<i64>) -> Self {
        if let Some(n) = servings {
            self.clauses.push(Clause::ServingsEq(n));
        }
        self
    }

    pub fn include(mut self, ingredient: Option<&str>) -> Self {
        if let Some(needle) = present(ingredient) {
            self.clauses.push(Clause::AnyIngredient(needle.to_string()));
        }
        self
    }

    pub fn exclude(mut self, ingredient: Option<&str>) -> Self {
        if let Some(needle) = present(ingredient) {
            self.clauses.push(Clause::NoIngredient(needle.to_string()));
        }
        self
    }

    pub fn build(self) -> RecipeQuery {
        if self.clauses.is_empty() {
            RecipeQuery::All
        } else {
            RecipeQuery::Matching(RecipeFilter { clauses: self.clauses })
        }
    }
}

/// Build the store query for a search request / 根据搜索参数生成查询
pub fn compose(params: &SearchParams) -> RecipeQuery {
    FilterBuilder::new()
        .contains(TextField::Name, params.name.as_deref(), CaseSensitivity::Sensitive)
        .include(params.include.as_deref())
        .exclude(params.exclude.as_deref())
        .contains(TextField::Category, params.category.as_deref(), CaseSensitivity::Insensitive)
        .servings(params.servings)
        .contains(TextField::Instructions, params.instructions.as_deref(), CaseSensitivity::Sensitive)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salad() -> Recipe {
        Recipe {
            id: "1".to_string(),
            name: "10-minute couscous salad".to_string(),
            instructions: "instructions 10-minute couscous salad".to_string(),
            category: "VEGETARIAN".to_string(),
            servings: 2,
            ingredients: vec![
                "100g couscous".to_string(),
                "2 spring onions".to_string(),
                "100ml hot low salt vegetable stock (from a cube is fine)".to_string(),
            ],
        }
    }

    fn chilli() -> Recipe {
        Recipe {
            id: "2".to_string(),
            name: "Quick chilli".to_string(),
            instructions: "instructions Quick chilli".to_string(),
            category: "LOW_CARB".to_string(),
            servings: 6,
            ingredients: vec!["100g chorizo".to_string(), "400g can kidney beans".to_string(), "2 spring onions".to_string()],
        }
    }

    fn params() -> SearchParams {
        SearchParams::default()
    }

    fn matching(p: SearchParams) -> Vec<String> {
        let query = compose(&p);
        [salad(), chilli()]
            .into_iter()
            .filter(|r| query.matches(r))
            .map(|r| r.name)
            .collect()
    }

    #[test]
    fn test_no_params_is_unfiltered() {
        assert_eq!(compose(&params()), RecipeQuery::All);
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let p = SearchParams {
            name: Some(String::new()),
            category: Some(String::new()),
            include: Some(String::new()),
            exclude: Some(String::new()),
            instructions: Some(String::new()),
            servings: None,
        };
        assert_eq!(compose(&p), RecipeQuery::All);
    }

    #[test]
    fn test_one_clause_per_param() {
        let p = SearchParams {
            name: Some("chilli".to_string()),
            servings: Some(2),
            exclude: Some("pepper".to_string()),
            include: Some("onions".to_string()),
            category: Some("Vegetarian".to_string()),
            instructions: Some("bowl".to_string()),
        };
        let RecipeQuery::Matching(filter) = compose(&p) else {
            panic!("expected a filter");
        };
        assert_eq!(filter.clauses().len(), 6);
        assert!(filter.clauses().contains(&Clause::Contains {
            field: TextField::Category,
            needle: "vegetarian".to_string(),
            case: CaseSensitivity::Insensitive,
        }));
        assert!(filter.clauses().contains(&Clause::ServingsEq(2)));
        assert!(filter.clauses().contains(&Clause::NoIngredient("pepper".to_string())));
        assert!(filter.clauses().contains(&Clause::AnyIngredient("onions".to_string())));
    }

    #[test]
    fn test_servings_exact_match() {
        assert_eq!(matching(SearchParams { servings: Some(2), ..params() }), vec!["10-minute couscous salad"]);
        assert!(matching(SearchParams { servings: Some(3), ..params() }).is_empty());
    }

    #[test]
    fn test_category_is_case_insensitive() {
        let found = matching(SearchParams { category: Some("vegetarian".to_string()), ..params() });
        assert_eq!(found, vec!["10-minute couscous salad"]);

        let found = matching(SearchParams { category: Some("carb".to_string()), ..params() });
        assert_eq!(found, vec!["Quick chilli"]);
    }

    #[test]
    fn test_name_and_instructions_are_case_sensitive() {
        assert_eq!(matching(SearchParams { name: Some("Quick".to_string()), ..params() }), vec!["Quick chilli"]);
        assert!(matching(SearchParams { name: Some("quick".to_string()), ..params() }).is_empty());

        let found = matching(SearchParams { instructions: Some("couscous".to_string()), ..params() });
        assert_eq!(found, vec!["10-minute couscous salad"]);
        assert!(matching(SearchParams { instructions: Some("COUSCOUS".to_string()), ..params() }).is_empty());
    }

    #[test]
    fn test_include_and_exclude_ingredients() {
        assert_eq!(matching(SearchParams { include: Some("couscous".to_string()), ..params() }), vec!["10-minute couscous salad"]);
        assert_eq!(matching(SearchParams { exclude: Some("couscous".to_string()), ..params() }), vec!["Quick chilli"]);
        assert_eq!(matching(SearchParams { exclude: Some("100g chorizo".to_string()), ..params() }), vec!["10-minute couscous salad"]);
        // shared ingredient: include keeps both, exclude drops both
        assert_eq!(matching(SearchParams { include: Some("spring onions".to_string()), ..params() }).len(), 2);
        assert!(matching(SearchParams { exclude: Some("spring onions".to_string()), ..params() }).is_empty());
    }

    #[test]
    fn test_clauses_are_anded() {
        let p = SearchParams {
            include: Some("spring onions".to_string()),
            category: Some("low_carb".to_string()),
            ..params()
        };
        assert_eq!(matching(p), vec!["Quick chilli"]);

        let p = SearchParams {
            servings: Some(2),
            category: Some("low_carb".to_string()),
            ..params()
        };
        assert!(matching(p).is_empty());
    }

    #[test]
    fn test_pattern_characters_match_literally() {
        assert!(matching(SearchParams { name: Some(".*".to_string()), ..params() }).is_empty());
        assert!(matching(SearchParams { name: Some("%".to_string()), ..params() }).is_empty());
        let found = matching(SearchParams { include: Some("(from a cube".to_string()), ..params() });
        assert_eq!(found, vec!["10-minute couscous salad"]);
    }

    #[test]
    fn test_sql_rendering() {
        let p = SearchParams {
            name: Some("chilli".to_string()),
            category: Some("VEG".to_string()),
            servings: Some(4),
            exclude: Some("pepper".to_string()),
            ..params()
        };
        let RecipeQuery::Matching(filter) = compose(&p) else {
            panic!("expected a filter");
        };
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id FROM recipes WHERE ");
        filter.push_sql(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM recipes WHERE instr(name, ?) > 0 \
             AND NOT EXISTS (SELECT 1 FROM json_each(recipes.ingredients) WHERE instr(json_each.value, ?) > 0) \
             AND instr(category_lower, ?) > 0 AND servings = ?"
        );
    }

    #[test]
    fn test_servings_query_string_parsing() {
        let p: SearchParams = serde_json::from_str(r#"{"servings":"2"}"#).unwrap();
        assert_eq!(p.servings, Some(2));

        let p: SearchParams = serde_json::from_str(r#"{"servings":""}"#).unwrap();
        assert_eq!(p.servings, None);

        assert!(serde_json::from_str::<SearchParams>(r#"{"servings":"two"}"#).is_err());

        let p: SearchParams = serde_json::from_str(r#"{"instructionn":"1"}"#).unwrap();
        assert_eq!(p, SearchParams::default());
    }
}
