//! Interactive shell for a leafdb table.
//!
//! Usage:
//!   leafdb <db_path> [--log-level <filter>]
//!
//! Commands:
//!   insert <id> <username> <email>
//!   select
//!   .btree        print the root leaf as JSON
//!   .constants    print the page layout constants
//!   .exit         flush and quit

use clap::Parser;
use leafdb::statement::{
    execute, is_meta_command, parse_meta_command, prepare, ExecuteResult, MetaCommand,
};
use leafdb::{Config, LayoutConstants, StorageError, Table};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "leafdb")]
#[command(about = "Single-table record store shell", long_about = None)]
struct Args {
    /// Database file (created if missing)
    db_path: PathBuf,

    /// Log filter, e.g. "debug" or "leafdb=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let table = match Table::open_with(Config::new(&args.db_path)) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(table, io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Read-eval-print loop. The table is closed on every way out of here.
///
/// Lines are decoded lossily, so bytes that are not UTF-8 end up as
/// replacement characters instead of ending the session.
fn run(mut table: Table, mut input: impl BufRead, mut out: impl Write) -> leafdb::Result<()> {
    let mut buf = Vec::new();

    loop {
        write!(out, "db > ")?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            // End of input behaves like .exit
            writeln!(out)?;
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        if is_meta_command(command) {
            match parse_meta_command(command) {
                MetaCommand::Exit => break,
                MetaCommand::BTree => {
                    let snapshot = table.leaf_snapshot()?;
                    let json = serde_json::to_string_pretty(&snapshot).map_err(io::Error::from)?;
                    writeln!(out, "{}", json)?;
                }
                MetaCommand::Constants => print_constants(&mut out)?,
                MetaCommand::Unrecognized(cmd) => writeln!(out, "Unrecognized command '{}'.", cmd)?,
            }
            continue;
        }

        let statement = match prepare(command) {
            Ok(statement) => statement,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match execute(&statement, &mut table) {
            Ok(ExecuteResult::Inserted) => writeln!(out, "Executed.")?,
            Ok(ExecuteResult::Rows(rows)) => {
                for row in rows {
                    writeln!(out, "{}", row)?;
                }
                writeln!(out, "Executed.")?;
            }
            Err(StorageError::DuplicateKey(_)) => writeln!(out, "Error: Duplicate key.")?,
            Err(StorageError::NodeFull { .. }) => writeln!(out, "Error: Table full.")?,
            Err(e) if !e.is_fatal() => writeln!(out, "Error: {}", e)?,
            Err(e) => return Err(e),
        }
    }

    table.close()
}

fn print_constants(out: &mut impl Write) -> io::Result<()> {
    let c = LayoutConstants::current();
    writeln!(out, "Constants:")?;
    writeln!(out, "ROW_SIZE: {}", c.row_size)?;
    writeln!(out, "COMMON_NODE_HEADER_SIZE: {}", c.common_node_header_size)?;
    writeln!(out, "LEAF_NODE_HEADER_SIZE: {}", c.leaf_node_header_size)?;
    writeln!(out, "LEAF_NODE_CELL_SIZE: {}", c.leaf_node_cell_size)?;
    writeln!(out, "LEAF_NODE_SPACE_FOR_CELLS: {}", c.leaf_node_space_for_cells)?;
    writeln!(out, "LEAF_NODE_MAX_CELLS: {}", c.leaf_node_max_cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafdb::LEAF_NODE_MAX_CELLS;
    use std::path::Path;
    use tempfile::tempdir;

    /// Run a scripted session and return everything written to the output
    fn session(path: &Path, script: &[u8]) -> leafdb::Result<String> {
        let mut out = Vec::new();
        run(Table::open(path)?, script, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn stored_keys(path: &Path) -> leafdb::Result<Vec<u32>> {
        Table::open(path)?.leaf_keys()
    }

    #[test]
    fn test_insert_and_select() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let out = session(&path, b"insert 2 bob b@x\ninsert 1 alice a@x\nselect\n.exit\n")?;
        assert_eq!(
            out,
            "db > Executed.\n\
             db > Executed.\n\
             db > (1, alice, a@x)\n(2, bob, b@x)\nExecuted.\n\
             db > "
        );
        Ok(())
    }

    #[test]
    fn test_error_messages() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let out = session(
            &path,
            b"insert 1 alice a@x\ninsert 1 bob b@x\n.foo\ninsert -1 x y\nupdate\n.exit\n",
        )?;
        let lines: Vec<&str> = out.split("db > ").filter(|s| !s.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                "Executed.\n",
                "Error: Duplicate key.\n",
                "Unrecognized command '.foo'.\n",
                "ID must be positive.\n",
                "Unrecognized keyword at start of 'update'.\n",
            ]
        );
        assert_eq!(stored_keys(&path)?, vec![1]);
        Ok(())
    }

    #[test]
    fn test_table_full() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut script = String::new();
        for id in 0..=LEAF_NODE_MAX_CELLS {
            script.push_str(&format!("insert {id} user{id} user{id}@x\n"));
        }
        let out = session(&path, script.as_bytes())?;

        assert_eq!(out.matches("Executed.").count(), LEAF_NODE_MAX_CELLS);
        assert!(out.ends_with("db > Error: Table full.\ndb > \n"));
        assert_eq!(stored_keys(&path)?.len(), LEAF_NODE_MAX_CELLS);
        Ok(())
    }

    #[test]
    fn test_end_of_input_closes_table() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        // No .exit: running out of input still flushes
        let out = session(&path, b"insert 3 c c@x\ninsert 1 a a@x")?;
        assert!(out.ends_with("db > \n"));
        assert_eq!(stored_keys(&path)?, vec![1, 3]);
        Ok(())
    }

    #[test]
    fn test_exit_ignores_remaining_input() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        session(&path, b"insert 1 a a@x\n.exit\ninsert 2 b b@x\n")?;
        assert_eq!(stored_keys(&path)?, vec![1]);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_line_keeps_session() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let out = session(
            &path,
            b"insert 1 a a@x\ninsert 2 caf\xe9 e@x\ninsert 3 c c@x\nselect\n",
        )?;
        assert!(out.contains("(2, caf\u{FFFD}, e@x)"));
        assert!(out.contains("(3, c, c@x)"));
        assert_eq!(stored_keys(&path)?, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_meta_output() -> leafdb::Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let out = session(&path, b"insert 5 e e@x\n.btree\n.constants\n")?;
        assert!(out.contains("\"keys\": [\n    5\n  ]"));
        assert!(out.contains("LEAF_NODE_MAX_CELLS: 13\n"));
        assert!(out.contains("ROW_SIZE: 296\n"));
        Ok(())
    }
}
