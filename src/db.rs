use crate::car::{Car, NewCar};
use crate::error::{CarResult, Rejection};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Instant;

const CAR_SELECT_SQL: &str = "SELECT id, brand, model, year, price FROM cars";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("event=db_setup module=db journal_mode={}", journal_mode);

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cars (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            brand TEXT NOT NULL,
            model TEXT NOT NULL,
            year INTEGER NOT NULL,
            price REAL NOT NULL
        )",
        [],
    )?;

    // Identity index: makes the duplicate check atomic with the insert.
    // Tables filled by older tools may already hold duplicates; keep working without it.
    if let Err(err) = conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_cars_identity ON cars(brand, model, year)",
        [],
    ) {
        if is_unique_violation(&err) {
            warn!(
                "event=db_setup module=db status=degraded reason=existing_duplicates error={}",
                err
            );
        } else {
            return Err(err);
        }
    }

    Ok(())
}

// ============================================================================
// STATEMENTS (borrowed connection)
// ============================================================================

/// All rows, in whatever order SQLite returns them.
pub fn get_all_cars(conn: &Connection) -> rusqlite::Result<Vec<Car>> {
    let mut stmt = conn.prepare(CAR_SELECT_SQL)?;

    let cars = stmt
        .query_map([], |row| {
            Ok(Car {
                id: row.get(0)?,
                brand: row.get(1)?,
                model: row.get(2)?,
                year: row.get(3)?,
                price: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cars)
}

/// Number of rows with the same (brand, model, year).
pub fn count_matching(conn: &Connection, car: &NewCar) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM cars WHERE brand = ?1 AND model = ?2 AND year = ?3",
        params![car.brand, car.model, car.year],
        |row| row.get(0),
    )
}

/// Insert and return the new row id.
pub fn insert_car(conn: &Connection, car: &NewCar) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO cars (brand, model, year, price) VALUES (?1, ?2, ?3, ?4)",
        params![car.brand, car.model, car.year, car.price],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns the number of rows removed (0 when the id does not exist).
pub fn delete_car_by_id(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM cars WHERE id = ?1", params![id])
}

pub fn verify_count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

// ============================================================================
// CAR STORE (one connection per operation)
// ============================================================================

/// Handle to the cars database file.
///
/// Holds no open connection. Each operation opens one, runs its statements,
/// and drops it before returning, whatever the outcome.
#[derive(Debug, Clone)]
pub struct CarStore {
    path: PathBuf,
}

impl CarStore {
    /// Open (creating if needed) the database at `path` and make sure the
    /// `cars` table exists.
    pub fn open(path: impl AsRef<Path>) -> CarResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };

        let started_at = Instant::now();
        let conn = store.connect()?;
        if let Err(err) = setup_database(&conn) {
            error!(
                "event=db_open module=db status=error path={} error={}",
                store.path.display(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=db_open module=db status=ok path={} duration_ms={}",
            store.path.display(),
            started_at.elapsed().as_millis()
        );

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }

    /// Record Listing: every stored car.
    pub fn list_all(&self) -> CarResult<Vec<Car>> {
        let conn = self.connect()?;
        let cars = get_all_cars(&conn)?;
        debug!("event=car_list module=db status=ok rows={}", cars.len());
        Ok(cars)
    }

    /// Record Writer: reject duplicates, otherwise insert.
    ///
    /// The existence check and the insert share one IMMEDIATE transaction, so
    /// two writers cannot both pass the check.
    pub fn write(&self, car: &NewCar) -> CarResult<i64> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if count_matching(&tx, car)? > 0 {
            info!(
                "event=car_add module=db status=rejected reason=duplicate year={}",
                car.year
            );
            return Err(Rejection::Duplicate.into());
        }

        let id = insert_car(&tx, car)?;

        tx.commit()?;
        info!("event=car_add module=db status=ok id={}", id);
        Ok(id)
    }

    /// Record Deleter (store side). Deleting a missing id affects 0 rows and
    /// still succeeds.
    pub fn delete(&self, id: i64) -> CarResult<usize> {
        let conn = self.connect()?;
        let removed = delete_car_by_id(&conn, id)?;
        info!(
            "event=car_delete module=db status=ok id={} rows={}",
            id, removed
        );
        Ok(removed)
    }

    pub fn count(&self) -> CarResult<i64> {
        let conn = self.connect()?;
        Ok(verify_count(&conn)?)
    }
}
