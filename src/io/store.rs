//! SQLite persistence of the input tables.
//!
//! Every input table gets its own SQL table: an `x` column plus one `REAL`
//! column per value column, named after the loaded columns. A SQL table that
//! already holds rows is left untouched, so repeated runs against one
//! database keep the first load.

use std::iter;
use std::path::Path;

use rusqlite::{Connection, params_from_iter};

use crate::domain::{Series, SeriesTable, X_COLUMN};
use crate::error::AppError;

pub const TRAIN_TABLE: &str = "train";
pub const IDEAL_TABLE: &str = "ideal";
pub const TEST_TABLE: &str = "test";

/// What [`store_table`] did with a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The SQL table was empty; this many rows were inserted.
    Inserted(usize),
    /// The SQL table already held this many rows; nothing was inserted.
    AlreadyPopulated(usize),
}

fn db_error(action: &str, e: rusqlite::Error) -> AppError {
    AppError::new(2, format!("{action}: {e}"))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn open_store(path: &Path) -> Result<Connection, AppError> {
    Connection::open(path).map_err(|e| db_error(&format!("Failed to open database '{}'", path.display()), e))
}

/// Create `name` if missing and insert every row of `table`, unless the SQL
/// table already has rows.
///
/// Rows are inserted in one transaction, in table order.
pub fn store_table(conn: &mut Connection, name: &str, table: &SeriesTable) -> Result<StoreOutcome, AppError> {
    let quoted = quote_ident(name);
    let columns: Vec<String> = iter::once(X_COLUMN)
        .chain(table.column_names())
        .map(quote_ident)
        .collect();

    let definitions: Vec<String> = columns.iter().map(|c| format!("{c} REAL NOT NULL")).collect();
    conn.execute(
        &format!("CREATE TABLE IF NOT EXISTS {quoted} ({})", definitions.join(", ")),
        [],
    )
    .map_err(|e| db_error(&format!("Failed to create table '{name}'"), e))?;

    let existing: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {quoted}"), [], |row| row.get(0))
        .map_err(|e| db_error(&format!("Failed to count rows of '{name}'"), e))?;
    if existing > 0 {
        return Ok(StoreOutcome::AlreadyPopulated(existing as usize));
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    let insert = format!("INSERT INTO {quoted} ({}) VALUES ({placeholders})", columns.join(", "));

    let tx = conn
        .transaction()
        .map_err(|e| db_error("Failed to start transaction", e))?;
    {
        let mut stmt = tx
            .prepare(&insert)
            .map_err(|e| db_error(&format!("Failed to prepare insert into '{name}'"), e))?;
        for (i, x) in table.x().iter().enumerate() {
            let row = iter::once(*x).chain(table.columns().iter().map(|c| c.values[i]));
            stmt.execute(params_from_iter(row))
                .map_err(|e| db_error(&format!("Failed to insert row {} into '{name}'", i + 1), e))?;
        }
    }
    tx.commit()
        .map_err(|e| db_error(&format!("Failed to commit rows of '{name}'"), e))?;

    Ok(StoreOutcome::Inserted(table.len()))
}

/// Read a stored table back, rows in insertion order.
pub fn read_stored_table(conn: &Connection, name: &str) -> Result<SeriesTable, AppError> {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {} ORDER BY rowid", quote_ident(name)))
        .map_err(|e| db_error(&format!("Failed to query table '{name}'"), e))?;

    let names: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
    if names.first().map(String::as_str) != Some(X_COLUMN) {
        return Err(AppError::new(2, format!("Stored table '{name}' does not start with an 'x' column")));
    }
    let width = names.len();

    let rows = stmt
        .query_map([], |row| (0..width).map(|i| row.get::<_, f64>(i)).collect::<Result<Vec<f64>, _>>())
        .map_err(|e| db_error(&format!("Failed to read table '{name}'"), e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| db_error(&format!("Failed to read a row of '{name}'"), e))?;

    let x = rows.iter().map(|r| r[0]).collect();
    let columns = names
        .iter()
        .enumerate()
        .skip(1)
        .map(|(j, n)| Series::new(n.clone(), rows.iter().map(|r| r[j]).collect()))
        .collect();
    Ok(SeriesTable::new(x, columns)?)
}

/// Store the three input tables in the database at `path`.
pub fn store_inputs(
    path: &Path,
    training: &SeriesTable,
    ideal: &SeriesTable,
    test: &SeriesTable,
) -> Result<(), AppError> {
    let mut conn = open_store(path)?;
    for (name, table) in [(TRAIN_TABLE, training), (IDEAL_TABLE, ideal), (TEST_TABLE, test)] {
        match store_table(&mut conn, name, table)? {
            StoreOutcome::Inserted(rows) => {
                log::info!("stored {rows} row(s) in table '{name}' of {}", path.display())
            }
            StoreOutcome::AlreadyPopulated(rows) => {
                log::info!("table '{name}' of {} already holds {rows} row(s); left as is", path.display())
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(x: &[f64], cols: &[(&str, &[f64])]) -> SeriesTable {
        SeriesTable::new(
            x.to_vec(),
            cols.iter().map(|(n, v)| Series::new(*n, v.to_vec())).collect(),
        )
        .unwrap()
    }

    #[test]
    fn stores_and_reads_back_in_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open_store(&dir.path().join("fit.db")).unwrap();
        let ideal = table(
            &[3.0, -1.5, 0.1 + 0.2],
            &[("y1", &[1.0 / 3.0, -0.0, 1e-300]), ("y2", &[2.5, 7.0, -123456.789])],
        );

        assert_eq!(store_table(&mut conn, IDEAL_TABLE, &ideal).unwrap(), StoreOutcome::Inserted(3));
        assert_eq!(read_stored_table(&conn, IDEAL_TABLE).unwrap(), ideal);
    }

    #[test]
    fn populated_table_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.db");
        let first = table(&[1.0, 2.0], &[("y", &[1.0, 2.0])]);
        let second = table(&[5.0], &[("y", &[9.0])]);

        let mut conn = open_store(&path).unwrap();
        store_table(&mut conn, TEST_TABLE, &first).unwrap();
        drop(conn);

        let mut conn = open_store(&path).unwrap();
        assert_eq!(
            store_table(&mut conn, TEST_TABLE, &second).unwrap(),
            StoreOutcome::AlreadyPopulated(2)
        );
        assert_eq!(read_stored_table(&conn, TEST_TABLE).unwrap(), first);
    }

    #[test]
    fn empty_table_can_be_filled_later() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open_store(&dir.path().join("fit.db")).unwrap();
        let empty = table(&[], &[("y1", &[])]);
        let full = table(&[1.0], &[("y1", &[4.0])]);

        assert_eq!(store_table(&mut conn, TRAIN_TABLE, &empty).unwrap(), StoreOutcome::Inserted(0));
        assert_eq!(store_table(&mut conn, TRAIN_TABLE, &full).unwrap(), StoreOutcome::Inserted(1));
        assert_eq!(read_stored_table(&conn, TRAIN_TABLE).unwrap(), full);
    }

    #[test]
    fn column_names_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open_store(&dir.path().join("fit.db")).unwrap();
        let odd = table(&[1.0], &[("select", &[1.0]), ("a \"b\"", &[2.0])]);

        store_table(&mut conn, "my table", &odd).unwrap();
        assert_eq!(read_stored_table(&conn, "my table").unwrap(), odd);
    }

    #[test]
    fn store_inputs_writes_three_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.db");
        let training = table(&[1.0, 2.0], &[("y1", &[1.0, 2.0]), ("y2", &[0.0, 0.5])]);
        let ideal = table(&[1.0, 2.0], &[("y1", &[1.5, 2.5])]);
        let test = table(&[2.0], &[("y", &[2.25])]);

        store_inputs(&path, &training, &ideal, &test).unwrap();

        let conn = open_store(&path).unwrap();
        assert_eq!(read_stored_table(&conn, TRAIN_TABLE).unwrap(), training);
        assert_eq!(read_stored_table(&conn, IDEAL_TABLE).unwrap(), ideal);
        assert_eq!(read_stored_table(&conn, TEST_TABLE).unwrap(), test);
    }

    #[test]
    fn mismatched_schema_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = open_store(&dir.path().join("fit.db")).unwrap();
        store_table(&mut conn, TRAIN_TABLE, &table(&[], &[("y1", &[])])).unwrap();

        let err = store_table(&mut conn, TRAIN_TABLE, &table(&[1.0], &[("z9", &[1.0])])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("'train'"), "{err}");
    }
}
