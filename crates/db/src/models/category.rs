//! Activity category models.

use muster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub organisation_id: DbId,
    pub parent_id: Option<DbId>,
    pub code: String,
    pub name: String,
    pub sort: i32,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A top-level category with its children, in sort order.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<Category>,
}

/// Insert for a category. `code` and `sort` are resolved by the caller.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub organisation_id: DbId,
    pub parent_id: Option<DbId>,
    pub code: String,
    pub name: String,
    pub sort: i32,
}

/// Direction for reordering a category among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Edits applied by [`CategoryRepo::update`](crate::repositories::CategoryRepo::update).
/// `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    pub active: Option<bool>,
}

/// Outcome of a category update.
#[derive(Debug, Clone)]
pub enum CategoryUpdate {
    Updated(Category),
    NotFound,
    /// Checkouts already recorded the current code; it was left as is.
    CodeFrozen { code: String },
}

/// Group a flat, sorted category list into a two-level tree.
///
/// Children whose parent is not in `rows` are dropped.
pub fn build_tree(rows: Vec<Category>) -> Vec<CategoryNode> {
    let (parents, children): (Vec<Category>, Vec<Category>) =
        rows.into_iter().partition(|c| c.parent_id.is_none());

    let mut nodes: Vec<CategoryNode> = parents
        .into_iter()
        .map(|category| CategoryNode {
            category,
            children: Vec::new(),
        })
        .collect();

    for child in children {
        if let Some(node) = nodes
            .iter_mut()
            .find(|n| Some(n.category.id) == child.parent_id)
        {
            node.children.push(child);
        }
    }
    nodes
}
