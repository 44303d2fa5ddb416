//! Line-oriented, pipe-delimited text format for the whole shop state.
//!
//! Layout, with no header or version marker:
//!
//! ```text
//! <item count>
//! name|condition|price|stock|category
//! <transaction count>
//! itemName|price|timestamp|itemId
//! <repair count>
//! itemName|issue|status|submissionTime|complexity|technician
//! <user count>
//! username|password|isStudent|loyaltyPoints|expertise|history
//! <recycling count>
//! itemName|weightKg|timestamp
//! ```
//!
//! The trailing fields of transactions (`itemId`), repairs (`complexity`,
//! `technician`) and users (`expertise`, `history`) are optional on read, so
//! files written by the older console programs still load. A file that ends
//! at a section boundary reads the remaining sections as empty; older files
//! simply have no recycling section.
//!
//! Fields are not escaped. Instead of writing a record that would not read
//! back, [`encode`] refuses any text field containing `|` or a line break.

use chrono::{DateTime, TimeZone, Utc};
use reshop_catalog::{Condition, InventoryLedger, NewItem};
use reshop_core::{User, UserDirectory};
use reshop_order::{RecyclingLog, RepairRequest, RepairStatus, RepairTracker, TransactionLog};
use reshop_shared::text::has_reserved_chars;
use reshop_shared::{ItemId, RepairId, FIELD_DELIMITER};
use std::fmt::Write as _;
use std::str::FromStr;

/// Everything the data file holds
#[derive(Debug, Clone, Default)]
pub struct ShopSnapshot {
    pub inventory: InventoryLedger,
    pub transactions: TransactionLog,
    pub repairs: RepairTracker,
    pub users: UserDirectory,
    pub recycling: RecyclingLog,
}

impl ShopSnapshot {
    pub fn encode(&self) -> Result<String, PersistenceError> {
        encode(self)
    }
}

/// Serialize every table in the fixed order inventory, transactions, repairs, users, recycling
pub fn encode(snapshot: &ShopSnapshot) -> Result<String, PersistenceError> {
    let ShopSnapshot {
        inventory,
        transactions,
        repairs,
        users,
        recycling,
    } = snapshot;
    let mut out = String::new();

    writeln!(out, "{}", inventory.len())?;
    for item in inventory.items() {
        let record = [
            text("inventory", "name", &item.name)?,
            text("inventory", "condition", item.condition.as_str())?,
            item.price.to_string(),
            item.stock.to_string(),
            text("inventory", "category", &item.category)?,
        ];
        push_record(&mut out, &record)?;
    }

    writeln!(out, "{}", transactions.len())?;
    for transaction in transactions.entries() {
        let record = [
            text("transactions", "item name", &transaction.item_name)?,
            transaction.price.to_string(),
            transaction.timestamp.timestamp().to_string(),
            transaction.item_id.map(|id| id.0.to_string()).unwrap_or_default(),
        ];
        push_record(&mut out, &record)?;
    }

    writeln!(out, "{}", repairs.len())?;
    for request in repairs.requests() {
        let record = [
            text("repairs", "item name", &request.item_name)?,
            text("repairs", "issue", &request.issue)?,
            request.status.as_str().to_string(),
            request.submitted_at.timestamp().to_string(),
            request.complexity.unwrap_or(0).to_string(),
            text(
                "repairs",
                "technician",
                request.assigned_technician.as_deref().unwrap_or_default(),
            )?,
        ];
        push_record(&mut out, &record)?;
    }

    writeln!(out, "{}", users.len())?;
    for user in users.users() {
        let history = user
            .purchase_history
            .iter()
            .map(|id| id.0.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let record = [
            text("users", "username", &user.username)?,
            text("users", "password", user.password.expose())?,
            if user.is_student { "1" } else { "0" }.to_string(),
            user.loyalty_points.to_string(),
            user.repair_expertise.to_string(),
            history,
        ];
        push_record(&mut out, &record)?;
    }

    writeln!(out, "{}", recycling.len())?;
    for entry in recycling.entries() {
        let record = [
            text("recycling", "item name", &entry.item_name)?,
            entry.weight_kg.to_string(),
            entry.timestamp.timestamp().to_string(),
        ];
        push_record(&mut out, &record)?;
    }

    Ok(out)
}

/// Parse a data file produced by [`encode`] or by the older console programs
pub fn decode(input: &str) -> Result<ShopSnapshot, PersistenceError> {
    let mut reader = Reader::new(input);
    let mut snapshot = ShopSnapshot::default();

    for _ in 0..reader.count()? {
        let (line, fields) = reader.record(4, 5)?;
        let item = NewItem::new(
            fields[0],
            Condition::parse(fields[1]),
            number(line, "price", fields[2])?,
            number(line, "stock", fields[3])?,
            fields.get(4).copied().unwrap_or_default(),
        );
        snapshot
            .inventory
            .add_item(item)
            .map_err(|e| PersistenceError::malformed(line, e))?;
    }

    for _ in 0..reader.count()? {
        let (line, fields) = reader.record(3, 4)?;
        let price = number(line, "price", fields[1])?;
        let timestamp = epoch(line, fields[2])?;
        match optional_number::<u32>(line, "item id", fields.get(3).copied())? {
            Some(id) => snapshot
                .transactions
                .record_sale(ItemId(id), fields[0], price, timestamp),
            None => snapshot.transactions.record(fields[0], price, timestamp),
        };
    }

    for _ in 0..reader.count()? {
        let (line, fields) = reader.record(4, 6)?;
        let status = RepairStatus::parse_stored(fields[2]).ok_or_else(|| {
            PersistenceError::malformed(line, format!("unknown repair status {:?}", fields[2]))
        })?;
        let mut request = RepairRequest::new(
            RepairId(0),
            fields[0].to_string(),
            fields[1].to_string(),
            epoch(line, fields[3])?,
        );
        request.status = status;
        request.complexity = optional_number::<u8>(line, "complexity", fields.get(4).copied())?
            .filter(|c| *c > 0);
        request.assigned_technician = fields
            .get(5)
            .filter(|name| !name.is_empty())
            .map(|name| name.to_string());
        snapshot
            .repairs
            .restore(request)
            .map_err(|e| PersistenceError::malformed(line, e))?;
    }

    for _ in 0..reader.count()? {
        let (line, fields) = reader.record(4, 6)?;
        let mut user = User::new(fields[0], fields[1], flag(line, fields[2])?);
        user.loyalty_points = number(line, "loyalty points", fields[3])?;
        user.repair_expertise =
            optional_number::<u8>(line, "expertise", fields.get(4).copied())?.unwrap_or(0);
        user.purchase_history = match fields.get(5).copied().unwrap_or_default() {
            "" => Vec::new(),
            history => history
                .split(',')
                .map(|id| number::<u32>(line, "purchase history", id).map(ItemId))
                .collect::<Result<_, _>>()?,
        };
        snapshot
            .users
            .insert(user)
            .map_err(|e| PersistenceError::malformed(line, e))?;
    }

    for _ in 0..reader.count()? {
        let (line, fields) = reader.record(3, 3)?;
        let weight_kg: f64 = number(line, "weight", fields[1])?;
        snapshot
            .recycling
            .record(fields[0], weight_kg, epoch(line, fields[2])?)
            .map_err(|e| PersistenceError::malformed(line, e))?;
    }

    Ok(snapshot)
}

fn text(section: &'static str, field: &'static str, value: &str) -> Result<String, PersistenceError> {
    if has_reserved_chars(value) {
        return Err(PersistenceError::DelimiterInField {
            section,
            field,
            value: value.to_string(),
        });
    }
    Ok(value.to_string())
}

fn push_record(out: &mut String, fields: &[String]) -> Result<(), PersistenceError> {
    let delimiter = FIELD_DELIMITER.to_string();
    writeln!(out, "{}", fields.join(delimiter.as_str()))?;
    Ok(())
}

fn number<T: FromStr>(line: usize, field: &str, raw: &str) -> Result<T, PersistenceError> {
    raw.trim().parse::<T>().map_err(|_| {
        PersistenceError::malformed(line, format!("invalid {} {:?}", field, raw))
    })
}

fn optional_number<T: FromStr>(
    line: usize,
    field: &str,
    raw: Option<&str>,
) -> Result<Option<T>, PersistenceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => number(line, field, raw).map(Some),
    }
}

fn epoch(line: usize, raw: &str) -> Result<DateTime<Utc>, PersistenceError> {
    let secs: i64 = number(line, "timestamp", raw)?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| PersistenceError::malformed(line, format!("timestamp out of range: {}", secs)))
}

fn flag(line: usize, raw: &str) -> Result<bool, PersistenceError> {
    match raw.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(PersistenceError::malformed(line, format!("invalid flag {:?}", other))),
    }
}

/// Line cursor that reports 1-based line numbers
struct Reader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .next()
            .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
    }

    /// Read a section's count line; end of input means an empty section.
    fn count(&mut self) -> Result<usize, PersistenceError> {
        loop {
            match self.next_line() {
                None => return Ok(0),
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((line_no, line)) => {
                    return line.trim().parse().map_err(|_| {
                        PersistenceError::malformed(line_no, format!("expected a record count, found {:?}", line))
                    })
                }
            }
        }
    }

    fn record(&mut self, min_fields: usize, max_fields: usize) -> Result<(usize, Vec<&'a str>), PersistenceError> {
        let (line_no, line) = self
            .next_line()
            .ok_or(PersistenceError::UnexpectedEof)?;
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();

        if fields.len() < min_fields || fields.len() > max_fields {
            return Err(PersistenceError::malformed(
                line_no,
                format!(
                    "expected {} to {} fields, found {}",
                    min_fields,
                    max_fields,
                    fields.len()
                ),
            ));
        }
        Ok((line_no, fields))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Data file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data file at line {line}: {reason}")]
    Malformed {
        line: usize,
        reason: String,
    },

    #[error("Data file ended in the middle of a section")]
    UnexpectedEof,

    #[error("Cannot save {section} {field} {value:?}: contains '|' or a line break")]
    DelimiterInField {
        section: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Formatting failed: {0}")]
    Format(#[from] std::fmt::Error),
}

impl PersistenceError {
    fn malformed(line: usize, reason: impl ToString) -> Self {
        PersistenceError::Malformed {
            line,
            reason: reason.to_string(),
        }
    }
}
