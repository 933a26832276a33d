//! Demo data seeder
//!
//! Populates the store with a realistic month of Malaysian spending:
//! mamak breakfasts, Grab rides, weekend Shopee hauls, monthly bills, and
//! a handful of journal entries. Uses a small xorshift PRNG seeded by the
//! caller so runs are reproducible.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use tracing::info;

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewJournalEntry, NewTransaction};

const FOOD_MERCHANTS: &[&str] = &[
    "Mamak Corner",
    "Nasi Kandar Pelita",
    "Old Town White Coffee",
    "Secret Recipe",
    "Sushi King",
    "McDonald's",
    "KFC",
    "Texas Chicken",
    "Subway",
    "Pizza Hut",
    "Starbucks",
    "ZUS Coffee",
    "Tealive",
    "Gong Cha",
    "Grab Food",
    "Food Panda",
    "Mixed Rice Stall",
    "Economy Rice",
    "Roti Canai Stall",
    "Nasi Lemak Stall",
];

const BREAKFAST_MERCHANTS: &[&str] = &[
    "Mamak Corner",
    "Roti Canai Stall",
    "Nasi Lemak Stall",
    "Old Town White Coffee",
    "Mixed Rice Stall",
];

const COFFEE_MERCHANTS: &[&str] = &["Starbucks", "ZUS Coffee", "Tealive", "Gong Cha"];

const GROCERY_MERCHANTS: &[&str] = &[
    "Aeon",
    "Lotus's",
    "Giant",
    "Mydin",
    "99 Speedmart",
    "Family Mart",
    "7-Eleven",
    "Village Grocer",
    "Jaya Grocer",
    "NSK Trade City",
];

const TRANSPORT_MERCHANTS: &[&str] = &[
    "Grab",
    "Shell",
    "Petronas",
    "Petron",
    "Touch 'n Go",
    "Rapid KL",
    "MRT",
    "Parking",
    "Car Wash",
];

const SHOPPING_MERCHANTS: &[&str] = &[
    "Shopee",
    "Lazada",
    "Uniqlo",
    "H&M",
    "Cotton On",
    "Padini",
    "Watson's",
    "Guardian",
    "Mr DIY",
    "Daiso",
    "IKEA",
];

const ENTERTAINMENT_MERCHANTS: &[&str] = &[
    "GSC Cinema",
    "TGV Cinema",
    "Karaoke Box",
    "Timezone",
    "Bowling",
    "Netflix",
    "Spotify",
    "Steam",
    "PlayStation Store",
];

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy)]
pub struct SeedSummary {
    pub transactions: usize,
    pub journal_entries: usize,
    /// True when the store already had data and nothing was written
    pub skipped: bool,
}

/// xorshift64* generator; deterministic per seed
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        // Zero state would stick at zero
        Self(seed.max(1))
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform float in [0, 1)
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        min + (self.next_u64() % (max - min + 1) as u64) as u32
    }

    fn amount(&mut self, min: f64, max: f64) -> f64 {
        ((self.next_f64() * (max - min) + min) * 100.0).round() / 100.0
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// "Dec 6, 2024"
pub fn format_date(t: DateTime<Utc>) -> String {
    format!("{} {}, {}", t.format("%b"), t.day(), t.year())
}

/// "9:05 PM"
pub fn format_time(hour: u32, minute: u32) -> String {
    let ampm = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", display, minute, ampm)
}

struct DayContext<'a> {
    rng: &'a mut Rng,
    date: DateTime<Utc>,
    transactions: Vec<NewTransaction>,
}

impl DayContext<'_> {
    fn push(
        &mut self,
        merchant: &str,
        hour: u32,
        category: &str,
        amount: f64,
        emotion: Option<(&str, &str)>,
    ) {
        let minute = self.rng.range_u32(0, 59);
        let at = self
            .date
            .with_hour(hour)
            .and_then(|d| d.with_minute(minute))
            .unwrap_or(self.date);
        self.transactions.push(NewTransaction {
            merchant: merchant.to_string(),
            date: format_date(self.date),
            time: format_time(hour, minute),
            timestamp: at.timestamp_millis(),
            category: category.to_string(),
            amount: -amount,
            emotion: emotion.map(|(e, _)| e.to_string()),
            emotion_emoji: emotion.map(|(_, emoji)| emoji.to_string()),
            notes: None,
        });
    }
}

fn day_transactions(rng: &mut Rng, date: DateTime<Utc>) -> Vec<NewTransaction> {
    let weekday = date.weekday().num_days_from_monday();
    let is_weekend = weekday >= 5;
    let mut ctx = DayContext {
        rng,
        date,
        transactions: Vec::new(),
    };

    // Breakfast
    if ctx.rng.chance(0.7) {
        let merchant = ctx.rng.pick(BREAKFAST_MERCHANTS);
        let hour = ctx.rng.range_u32(7, 8);
        let amount = ctx.rng.amount(5.0, 15.0);
        let emotion = ctx.rng.chance(0.5).then_some(("Necessary", "✅"));
        ctx.push(merchant, hour, "Food", amount, emotion);
    }

    // Morning coffee
    if ctx.rng.chance(0.4) {
        let merchant = ctx.rng.pick(COFFEE_MERCHANTS);
        let hour = ctx.rng.range_u32(9, 10);
        let amount = ctx.rng.amount(10.0, 25.0);
        let emotion = ctx.rng.chance(0.4).then_some(("Impulse", "😅"));
        ctx.push(merchant, hour, "Food", amount, emotion);
    }

    // Lunch
    if ctx.rng.chance(0.9) {
        let merchant = ctx.rng.pick(FOOD_MERCHANTS);
        let hour = ctx.rng.range_u32(12, 13);
        let amount = ctx.rng.amount(10.0, 35.0);
        let emotion = ctx.rng.chance(0.5).then_some(("Necessary", "✅"));
        ctx.push(merchant, hour, "Food", amount, emotion);
    }

    // Transport, mostly on weekdays
    if ctx.rng.chance(if is_weekend { 0.3 } else { 0.7 }) {
        let merchant = ctx.rng.pick(TRANSPORT_MERCHANTS);
        let hour = if is_weekend {
            ctx.rng.range_u32(10, 17)
        } else {
            8
        };
        let amount = ctx.rng.amount(5.0, 50.0);
        ctx.push(merchant, hour, "Transport", amount, Some(("Necessary", "✅")));
    }

    // Dinner
    if ctx.rng.chance(0.8) {
        let merchant = ctx.rng.pick(FOOD_MERCHANTS);
        let hour = ctx.rng.range_u32(18, 20);
        let amount = ctx.rng.amount(15.0, 50.0);
        let emotion = ctx.rng.chance(0.4).then_some(("Planned", "📝"));
        ctx.push(merchant, hour, "Food", amount, emotion);
    }

    if is_weekend {
        if ctx.rng.chance(0.6) {
            let merchant = ctx.rng.pick(SHOPPING_MERCHANTS);
            let hour = ctx.rng.range_u32(14, 17);
            let amount = ctx.rng.amount(30.0, 200.0);
            let emotion = if ctx.rng.chance(0.5) {
                ("Impulse", "😅")
            } else {
                ("Planned", "📝")
            };
            ctx.push(merchant, hour, "Shopping", amount, Some(emotion));
        }
        if ctx.rng.chance(0.4) {
            let merchant = ctx.rng.pick(ENTERTAINMENT_MERCHANTS);
            let hour = ctx.rng.range_u32(15, 19);
            let amount = ctx.rng.amount(20.0, 80.0);
            ctx.push(merchant, hour, "Entertainment", amount, Some(("Planned", "📝")));
        }
        if ctx.rng.chance(0.5) {
            let merchant = ctx.rng.pick(GROCERY_MERCHANTS);
            let hour = ctx.rng.range_u32(10, 13);
            let amount = ctx.rng.amount(50.0, 200.0);
            ctx.push(merchant, hour, "Groceries", amount, Some(("Necessary", "✅")));
        }
    }

    // Late-night online shopping
    if ctx.rng.chance(0.2) {
        let merchant = ctx.rng.pick(&["Shopee", "Lazada"]);
        let hour = ctx.rng.range_u32(20, 22);
        let amount = ctx.rng.amount(20.0, 150.0);
        let emotion = if ctx.rng.chance(0.6) {
            ("Impulse", "😅")
        } else {
            ("Planned", "📝")
        };
        ctx.push(merchant, hour, "Shopping", amount, Some(emotion));
    }

    ctx.transactions
}

fn journal_entries(now: DateTime<Utc>) -> Vec<NewJournalEntry> {
    let entry = |content: &str, mood: &str, emoji: &str, days_ago: i64| {
        let at = now - Duration::days(days_ago);
        NewJournalEntry {
            content: content.to_string(),
            mood: mood.to_string(),
            mood_emoji: emoji.to_string(),
            timestamp: at.timestamp_millis(),
            date: format_date(at),
            related_transaction_id: None,
        }
    };

    vec![
        entry(
            "Spent way too much on Shopee again during the 12.12 sale. The discounts were too tempting but I ended up buying things I don't really need. Need to uninstall the app during sales...",
            "Regretful", "😔", 2,
        ),
        entry(
            "Had a great mamak session with friends tonight. RM 30 well spent on good food and company. These moments are worth the money.",
            "Happy", "😊", 5,
        ),
        entry(
            "Finally paid off my credit card bill in full this month! Feeling accomplished. The strict budgeting is paying off.",
            "Proud", "🎉", 7,
        ),
        entry(
            "Grabbed a Starbucks again today even though I have coffee at home. It's becoming a habit I need to break. That's RM 20 I could save daily.",
            "Reflective", "🤔", 10,
        ),
        entry(
            "Went grocery shopping at AEON with a list and stuck to it! Only bought what I needed. Small win but it feels good.",
            "Content", "✨", 14,
        ),
        entry(
            "Petrol prices went up again. Filled up the tank and it cost RM 180. Transport costs are really eating into my budget.",
            "Worried", "😟", 18,
        ),
    ]
}

/// Seed the store with `days` of demo transactions plus monthly bills and
/// journal entries. A store that already has transactions is left alone.
pub fn seed_demo_data(
    db: &Database,
    days: u32,
    seed: u64,
    now: DateTime<Utc>,
) -> Result<SeedSummary> {
    if db.counts()?.transactions > 0 {
        return Ok(SeedSummary {
            transactions: 0,
            journal_entries: 0,
            skipped: true,
        });
    }

    let mut rng = Rng::new(seed);
    let mut transactions = Vec::new();

    for i in 0..days {
        let date = now - Duration::days(i as i64);
        transactions.extend(day_transactions(&mut rng, date));
    }

    // Monthly bills land at the start of the month, one per day
    let bills: [(&str, f64, f64, &str); 6] = [
        ("Tenaga Nasional", 80.0, 180.0, "Bills"),
        ("Air Selangor", 15.0, 40.0, "Bills"),
        ("Unifi", 120.0, 160.0, "Bills"),
        ("Maxis", 50.0, 120.0, "Bills"),
        ("Netflix", 44.90, 44.90, "Entertainment"),
        ("Spotify", 14.90, 14.90, "Entertainment"),
    ];
    let month_start = now
        .with_day(1)
        .and_then(|d| d.with_hour(0))
        .and_then(|d| d.with_minute(0))
        .and_then(|d| d.with_second(0))
        .unwrap_or(now);
    for (idx, (merchant, min, max, category)) in bills.iter().enumerate() {
        let at = month_start + Duration::days(idx as i64);
        transactions.push(NewTransaction {
            merchant: merchant.to_string(),
            date: format_date(at),
            time: "12:00 AM".to_string(),
            timestamp: at.timestamp_millis(),
            category: category.to_string(),
            amount: -rng.amount(*min, *max),
            emotion: Some("Necessary".to_string()),
            emotion_emoji: Some("✅".to_string()),
            notes: None,
        });
    }

    for tx in &transactions {
        db.insert_transaction(tx)?;
    }

    let entries = journal_entries(now);
    for entry in &entries {
        db.insert_journal_entry(entry)?;
    }

    info!(
        transactions = transactions.len(),
        journal_entries = entries.len(),
        "Demo data seeded"
    );
    Ok(SeedSummary {
        transactions: transactions.len(),
        journal_entries: entries.len(),
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 6, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_date(fixed_now()), "Dec 6, 2024");
        assert_eq!(format_time(0, 5), "12:05 AM");
        assert_eq!(format_time(9, 30), "9:30 AM");
        assert_eq!(format_time(12, 0), "12:00 PM");
        assert_eq!(format_time(21, 7), "9:07 PM");
    }

    #[test]
    fn test_seed_is_deterministic() {
        let now = fixed_now();
        let a = Database::in_memory().unwrap();
        let b = Database::in_memory().unwrap();
        let summary_a = seed_demo_data(&a, 30, 42, now).unwrap();
        let summary_b = seed_demo_data(&b, 30, 42, now).unwrap();

        assert!(!summary_a.skipped);
        assert_eq!(summary_a.transactions, summary_b.transactions);
        let list_a = a.list_transactions().unwrap();
        let list_b = b.list_transactions().unwrap();
        assert_eq!(list_a.len(), list_b.len());
        for (ta, tb) in list_a.iter().zip(&list_b) {
            assert_eq!(ta.merchant, tb.merchant);
            assert_eq!(ta.amount, tb.amount);
        }
    }

    #[test]
    fn test_seed_skips_populated_store() {
        let now = fixed_now();
        let db = Database::in_memory().unwrap();
        let first = seed_demo_data(&db, 7, 1, now).unwrap();
        assert!(first.transactions > 0);

        let second = seed_demo_data(&db, 7, 1, now).unwrap();
        assert!(second.skipped);
        assert_eq!(second.transactions, 0);
        assert_eq!(
            db.counts().unwrap().transactions as usize,
            first.transactions
        );
    }

    #[test]
    fn test_all_seeded_amounts_are_expenses() {
        let now = fixed_now();
        let db = Database::in_memory().unwrap();
        seed_demo_data(&db, 14, 7, now).unwrap();
        for tx in db.list_transactions().unwrap() {
            assert!(tx.amount < 0.0, "{} has non-expense amount", tx.merchant);
        }
    }
}
