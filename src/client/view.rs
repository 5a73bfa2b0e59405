//! 搜索框渲染
//!
//! 结果区域四种状态互斥，按优先级：加载中、有结果、查询够长但无结果、空白。

use std::fmt;

use super::search::SearchState;

pub const HEADING: &str = "Live Product Search";
pub const INPUT_PLACEHOLDER: &str = "Search for products...";
pub const BUTTON_LABEL: &str = "Search";
pub const NO_RESULTS_MESSAGE: &str = "No products found.";
pub const SKELETON_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub value: String,
    pub placeholder: &'static str,
}

/// 仅作展示，搜索由输入自动触发
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    pub disabled: bool,
}

/// 加载占位行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skeleton {
    pub role: &'static str,
    pub aria_label: &'static str,
}

impl Skeleton {
    const LOADING: Skeleton = Skeleton {
        role: "status",
        aria_label: "Loading",
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsRegion {
    Empty,
    Loading(Vec<Skeleton>),
    Products(Vec<ProductRow>),
    NoResults(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchView {
    pub input: InputField,
    pub button: Button,
    pub results: ResultsRegion,
}

impl SearchView {
    pub fn render(raw_query: &str, state: &SearchState, min_query_len: usize) -> Self {
        let loading = state.is_loading();
        let products = state.results();

        let results = if loading {
            ResultsRegion::Loading(vec![Skeleton::LOADING; SKELETON_ROWS])
        } else if !products.is_empty() {
            ResultsRegion::Products(
                products
                    .iter()
                    .map(|p| ProductRow {
                        id: p.id,
                        name: p.name.clone(),
                        description: p.description.clone(),
                    })
                    .collect(),
            )
        } else if state.stable_query.chars().count() >= min_query_len {
            ResultsRegion::NoResults(NO_RESULTS_MESSAGE)
        } else {
            ResultsRegion::Empty
        };

        Self {
            input: InputField {
                value: raw_query.to_string(),
                placeholder: INPUT_PLACEHOLDER,
            },
            button: Button {
                label: BUTTON_LABEL,
                disabled: loading,
            },
            results,
        }
    }

    /// `role="status"` 元素的数量
    pub fn status_count(&self) -> usize {
        match &self.results {
            ResultsRegion::Loading(rows) => rows.iter().filter(|s| s.role == "status").count(),
            _ => 0,
        }
    }

    pub fn product_rows(&self) -> &[ProductRow] {
        match &self.results {
            ResultsRegion::Products(rows) => rows,
            _ => &[],
        }
    }
}

impl fmt::Display for SearchView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.input.value.is_empty() {
            writeln!(f, "[ {} ]", self.input.placeholder)?;
        } else {
            writeln!(f, "[ {} ]", self.input.value)?;
        }
        if self.button.disabled {
            writeln!(f, "( {} ) (disabled)", self.button.label)?;
        } else {
            writeln!(f, "( {} )", self.button.label)?;
        }

        match &self.results {
            ResultsRegion::Empty => {}
            ResultsRegion::Loading(rows) => {
                for row in rows {
                    writeln!(f, "  ░░░░ ░░░░░░░░  [{}: {}]", row.role, row.aria_label)?;
                }
            }
            ResultsRegion::Products(rows) => {
                for row in rows {
                    writeln!(f, "  {}  {}", row.name, row.description)?;
                }
            }
            ResultsRegion::NoResults(message) => writeln!(f, "  {}", message)?,
        }
        Ok(())
    }
}
