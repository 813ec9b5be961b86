//! Interactive voucher menu over explicitly passed reader and writer handles.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use tracing::{info, warn};
use vouchers_core::domain::discount::{DiscountValue, VoucherType};
use vouchers_core::domain::voucher::Voucher;
use vouchers_db::{CustomerService, Storage, VoucherService};

use crate::commands::{init_logging, prepare, CommandResult, StepFailure};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    Exit,
    Create,
    List,
}

impl MenuCommand {
    const ALL: [MenuCommand; 3] = [MenuCommand::Exit, MenuCommand::Create, MenuCommand::List];

    fn ordinal(self) -> &'static str {
        match self {
            Self::Exit => "0",
            Self::Create => "1",
            Self::List => "2",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Create => "create",
            Self::List => "list",
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::Exit => "to exit the program.",
            Self::Create => "to create a new voucher.",
            Self::List => "to list vouchers or black-listed customers.",
        }
    }
}

impl FromStr for MenuCommand {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|command| command.ordinal() == normalized || command.keyword() == normalized)
            .ok_or_else(|| anyhow!("unknown menu option `{}`", value.trim()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListTarget {
    Vouchers,
    BlacklistedCustomers,
}

impl ListTarget {
    const ALL: [ListTarget; 2] = [ListTarget::Vouchers, ListTarget::BlacklistedCustomers];

    fn ordinal(self) -> &'static str {
        match self {
            Self::Vouchers => "1",
            Self::BlacklistedCustomers => "2",
        }
    }
}

impl fmt::Display for ListTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vouchers => "Created Vouchers List",
            Self::BlacklistedCustomers => "Black Customers List",
        })
    }
}

impl FromStr for ListTarget {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.ordinal() == value.trim())
            .ok_or_else(|| anyhow!("unknown list option `{}`", value.trim()))
    }
}

pub struct Console<R, W> {
    reader: R,
    writer: W,
    vouchers: VoucherService,
    customers: CustomerService,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(reader: R, writer: W, storage: &Storage) -> Self {
        Self {
            reader,
            writer,
            vouchers: storage.voucher_service(),
            customers: storage.customer_service(),
        }
    }

    /// Runs the menu loop until `exit` or end of input. Invalid input and failed
    /// operations are printed and the loop continues; only I/O failures on the
    /// handles themselves end the session with an error.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            self.show_menu()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            let outcome = match line.parse::<MenuCommand>() {
                Ok(MenuCommand::Exit) => break,
                Ok(MenuCommand::Create) => self.create_voucher().await,
                Ok(MenuCommand::List) => self.list().await,
                Err(error) => Err(error),
            };

            if let Err(error) = outcome {
                if let Some(io_error) = error.downcast_ref::<io::Error>() {
                    return Err(anyhow!("console i/o failed: {io_error}"));
                }
                warn!(
                    event_name = "console.operation.rejected",
                    error = %error,
                    "console input rejected"
                );
                writeln!(self.writer, "{error}")?;
            }
        }

        writeln!(self.writer, "Program has ended.")?;
        self.writer.flush()?;
        Ok(())
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.writer, "=== Voucher Program ===")?;
        for command in MenuCommand::ALL {
            writeln!(
                self.writer,
                "Type {}({}) {}",
                command.keyword(),
                command.ordinal(),
                command.prompt()
            )?;
        }
        self.writer.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, message: &str) -> anyhow::Result<String> {
        writeln!(self.writer, "{message}")?;
        self.writer.flush()?;
        self.read_line()?.context("input closed before a value was entered")
    }

    async fn create_voucher(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer, "Select a voucher type:")?;
        for voucher_type in VoucherType::ALL {
            writeln!(self.writer, "{}: {}", voucher_type.ordinal(), voucher_type.label())?;
        }
        let voucher_type: VoucherType = self.prompt("Enter a number:")?.parse()?;

        let raw_value = self.prompt("Enter the discount value:")?;
        let discount = DiscountValue::parse(voucher_type, &raw_value)?;

        let created = self.vouchers.create(Voucher::new(discount)).await?;
        info!(
            event_name = "console.voucher.created",
            voucher_id = %created.id,
            "voucher created from console"
        );
        writeln!(self.writer, "{created} created.")?;
        Ok(())
    }

    async fn list(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer, "Select what to list:")?;
        for target in ListTarget::ALL {
            writeln!(self.writer, "{}: {}", target.ordinal(), target)?;
        }
        let target: ListTarget = self.prompt("Enter a number:")?.parse()?;

        let lines: Vec<String> = match target {
            ListTarget::Vouchers => {
                self.vouchers.find_all().await?.iter().map(ToString::to_string).collect()
            }
            ListTarget::BlacklistedCustomers => {
                self.customers.find_blacklisted().await?.iter().map(ToString::to_string).collect()
            }
        };

        writeln!(self.writer, "=== {target} ===")?;
        for line in lines {
            writeln!(self.writer, "{line}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("console") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };
    init_logging(&config);

    let result = runtime.block_on(async {
        let storage = Storage::open(&config)
            .await
            .map_err(|error| ("storage_init", error.to_string(), 4u8))?;

        let stdin = io::stdin();
        let stdout = io::stdout();
        let session = Console::new(stdin.lock(), stdout.lock(), &storage).run().await;

        if let Some(pool) = &storage.pool {
            pool.close().await;
        }
        session.map_err(|error| ("console_io", error.to_string(), 6u8))?;
        Ok::<(), StepFailure>(())
    });

    match result {
        Ok(()) => CommandResult::success(
            "console",
            format!("console session ended ({} storage)", config.storage.backend.as_str()),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("console", error_class, message, exit_code)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use vouchers_core::domain::customer::Customer;
    use vouchers_db::Storage;

    use super::{Console, ListTarget, MenuCommand};

    async fn session(storage: &Storage, input: &str) -> String {
        let mut output = Vec::new();
        Console::new(Cursor::new(input.as_bytes().to_vec()), &mut output, storage)
            .run()
            .await
            .expect("console session should end cleanly");
        String::from_utf8(output).expect("utf8 output")
    }

    #[test]
    fn menu_accepts_ordinals_and_keywords() {
        assert_eq!("0".parse::<MenuCommand>().expect("exit"), MenuCommand::Exit);
        assert_eq!(" CREATE ".parse::<MenuCommand>().expect("create"), MenuCommand::Create);
        assert_eq!("2".parse::<MenuCommand>().expect("list"), MenuCommand::List);
        assert!("3".parse::<MenuCommand>().is_err());
        assert_eq!("2".parse::<ListTarget>().expect("target"), ListTarget::BlacklistedCustomers);
    }

    #[tokio::test]
    async fn create_then_list_prints_the_voucher() {
        let storage = Storage::in_memory();

        let output = session(&storage, "1\n2\n25\n2\n1\nexit\n").await;

        let vouchers = storage.voucher_service().find_all().await.expect("vouchers");
        assert_eq!(vouchers.len(), 1);
        let rendered = vouchers[0].to_string();
        assert!(output.contains(&format!("{rendered} created.")));
        assert!(output.contains("=== Created Vouchers List ==="));
        assert_eq!(output.matches(&rendered).count(), 2);
        assert_eq!(output.matches("Enter a number:\n").count(), 2);
        assert!(output.ends_with("Program has ended.\n"));
    }

    #[tokio::test]
    async fn invalid_discount_is_reported_and_loop_continues() {
        let storage = Storage::in_memory();

        let output = session(&storage, "create\n2\n101\n1\n1\n-5\n0\n").await;

        assert!(output.contains("percent discount must be within 0..=100, got 101"));
        assert!(output.contains("discount value must not be negative, got -5"));
        assert!(storage.voucher_service().find_all().await.expect("vouchers").is_empty());
        assert_eq!(output.matches("=== Voucher Program ===").count(), 3);
    }

    #[tokio::test]
    async fn unknown_options_are_reported() {
        let storage = Storage::in_memory();

        let output = session(&storage, "9\nlist\n7\n").await;

        assert!(output.contains("unknown menu option `9`"));
        assert!(output.contains("unknown list option `7`"));
        assert!(output.ends_with("Program has ended.\n"));
    }

    #[tokio::test]
    async fn list_shows_only_blacklisted_customers() {
        let storage = Storage::in_memory();
        let customers = storage.customer_service();
        let banned = customers
            .create(Customer::new("mallory", "mallory@example.com", true).expect("customer"))
            .await
            .expect("create");
        customers
            .create(Customer::new("alice", "alice@example.com", false).expect("customer"))
            .await
            .expect("create");

        let output = session(&storage, "2\n2\n0\n").await;

        assert!(output.contains("=== Black Customers List ==="));
        assert!(output.contains(&banned.to_string()));
        assert!(!output.contains("alice@example.com"));
    }
}
