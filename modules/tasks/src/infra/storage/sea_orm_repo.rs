//! SeaORM-backed repository implementation for the domain port.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction.

use anyhow::Context;
use chrono::Utc;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::contract::model::{NewTask, Task, TaskPatch};
use crate::domain::query::TaskFilter;
use crate::domain::repo::TasksRepository;
use crate::domain::rules::{Sort, SortDirection, SortField};
use crate::infra::storage::entity::{ActiveModel as TaskAM, Column, Entity as TaskEntity};

const LIKE_ESCAPE: char = '\\';

pub struct SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Case folding shared by the stored `title_folded` column and search needles.
fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// `%needle%` over folded text, with LIKE wildcards in the needle escaped.
fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in fold_case(needle).chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn sort_column(field: SortField) -> Column {
    match field {
        SortField::Id => Column::Id,
        SortField::Title => Column::Title,
        SortField::CreatedAt => Column::CreatedAt,
        SortField::UpdatedAt => Column::UpdatedAt,
    }
}

fn apply_filter(mut select: Select<TaskEntity>, filter: &TaskFilter) -> Select<TaskEntity> {
    if let Some(completed) = filter.completed {
        select = select.filter(Column::Completed.eq(completed));
    }
    if let Some(search) = &filter.search {
        select = select.filter(
            Column::TitleFolded.like(LikeExpr::new(contains_pattern(search)).escape(LIKE_ESCAPE)),
        );
    }
    select
}

#[async_trait::async_trait]
impl<C> TasksRepository for SeaOrmTasksRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn store(&self, task: NewTask) -> anyhow::Result<i64> {
        let now = Utc::now();
        let m = TaskAM {
            id: NotSet,
            title_folded: Set(fold_case(&task.title)),
            title: Set(task.title),
            completed: Set(task.completed),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = m.insert(&self.conn).await.context("insert failed")?;
        Ok(inserted.id)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Task>> {
        let found = TaskEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find failed")?;
        Ok(found.map(Into::into))
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> anyhow::Result<bool> {
        let mut m = TaskAM {
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(title) = patch.title {
            m.title_folded = Set(fold_case(&title));
            m.title = Set(title);
        }
        if let Some(completed) = patch.completed {
            m.completed = Set(completed);
        }

        let res = TaskEntity::update_many()
            .set(m)
            .filter(Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("update failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = TaskEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn query(
        &self,
        filter: &TaskFilter,
        sort: Sort,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<(Vec<Task>, u64)> {
        let select = apply_filter(TaskEntity::find(), filter);

        let total = select
            .clone()
            .count(&self.conn)
            .await
            .context("count failed")?;

        // Nothing left to read; also keeps out-of-range offsets away from the driver.
        if offset >= total {
            return Ok((Vec::new(), total));
        }

        // id breaks ties so pages never overlap or skip rows
        let order = match sort.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let rows = select
            .order_by(sort_column(sort.field), order.clone())
            .order_by(Column::Id, order)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("query failed")?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }
}
