//! Postgres-backed product store.
//!
//! ## Sessions
//!
//! Every operation checks a connection out of the pool when it starts and
//! holds it in a `PoolConnection` guard. The guard returns the connection on
//! drop, so it is released on every exit path, including `?` early returns.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique / check / not-null violation) | `23505` / `23514` / `23502` | `Constraint` |
//! | Database (other) | any other | `Query` |
//! | PoolTimedOut / PoolClosed / Io / Tls | N/A | `Unavailable` |
//! | ColumnDecode / ColumnNotFound / Decode | N/A | `Decode` |
//! | Other | N/A | `Query` |

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row};
use tracing::{instrument, Span};

use tracify_core::ProductId;
use tracify_products::{Product, ProductCreate};

use super::r#trait::{ProductStore, StoreError};

/// Advisory lock key serializing startup seeding across instances.
const SEED_LOCK_KEY: i64 = 0x7472_6163_6966_79;

const CREATE_PRODUCTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        description TEXT NOT NULL,
        price       DOUBLE PRECISION NOT NULL,
        quantity    BIGINT NOT NULL
    )
"#;

/// Postgres-backed product store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is cheap to clone and safe to share
/// across tasks.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.session("ensure_schema").await?;
        sqlx::query(CREATE_PRODUCTS_TABLE)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn session(&self, operation: &str) -> Result<PoolConnection<Postgres>, StoreError> {
        self.pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self), fields(product_count = tracing::field::Empty), err)]
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.session("list").await?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, quantity
            FROM products
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        let products = decode_rows(&rows)?;
        Span::current().record("product_count", products.len());
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let mut conn = self.session("get").await?;

        let row = sqlx::query(
            r#"
            SELECT id, name, description, price, quantity
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self, fields), err)]
    async fn insert(&self, fields: ProductCreate) -> Result<Product, StoreError> {
        let mut conn = self.session("insert").await?;

        let row = insert_returning(&mut *conn, &fields)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        decode_row(&row)
    }

    #[instrument(skip(self, fields), fields(product_id = %id), err)]
    async fn update(&self, id: ProductId, fields: ProductCreate) -> Result<Option<Product>, StoreError> {
        let mut conn = self.session("update").await?;

        let row = sqlx::query(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                quantity = $5
            WHERE id = $1
            RETURNING id, name, description, price, quantity
            "#,
        )
        .bind(id.get())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(fields.quantity)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        row.as_ref().map(decode_row).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut conn = self.session("delete").await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<u64, StoreError> {
        let mut conn = self.session("count").await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        Ok(count.max(0) as u64)
    }

    /// Runs inside one transaction holding a transaction-scoped advisory
    /// lock, so two instances starting together cannot both see an empty
    /// table. A failure before commit rolls everything back on drop.
    #[instrument(skip(self, products), fields(candidate_count = products.len()), err)]
    async fn insert_if_empty(&self, products: Vec<ProductCreate>) -> Result<usize, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_if_empty", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_if_empty", e))?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_if_empty", e))?;

        if existing > 0 {
            return Ok(0);
        }

        for fields in &products {
            insert_returning(&mut *tx, fields)
                .await
                .map_err(|e| map_sqlx_error("insert_if_empty", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_if_empty", e))?;

        Ok(products.len())
    }
}

async fn insert_returning(
    conn: &mut sqlx::PgConnection,
    fields: &ProductCreate,
) -> Result<PgRow, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO products (name, description, price, quantity)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, description, price, quantity
        "#,
    )
    .bind(&fields.name)
    .bind(&fields.description)
    .bind(fields.price)
    .bind(fields.quantity)
    .fetch_one(conn)
    .await
}

fn decode_row(row: &PgRow) -> Result<Product, StoreError> {
    ProductRow::from_row(row)
        .map(Product::from)
        .map_err(|e| StoreError::Decode(format!("failed to deserialize product row: {e}")))
}

fn decode_rows(rows: &[PgRow]) -> Result<Vec<Product>, StoreError> {
    rows.iter().map(decode_row).collect()
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23514") | Some("23502") => StoreError::Constraint(msg),
                _ => StoreError::Query(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("timed out acquiring a connection in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {}: {}", operation, e)),
        err @ (sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_)) => {
            StoreError::Decode(format!("{} in {}", err, operation))
        }
        _ => StoreError::Query(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: f64,
    quantity: i64,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::from_parts(
            ProductId::new(row.id),
            ProductCreate {
                name: row.name,
                description: row.description,
                price: row.price,
                quantity: row.quantity,
            },
        )
    }
}
