use fake::{faker::name::en::Name, Fake};

use crate::models::traders::{Platform, TraderRecord};

pub fn trader(rank: u32, name: &str, all_time: &str, weekly: &str, monthly: &str) -> TraderRecord {
    trader_on(Platform::Hyperliquid, rank, name, all_time, weekly, monthly)
}

pub fn trader_on(
    platform: Platform,
    rank: u32,
    name: &str,
    all_time: &str,
    weekly: &str,
    monthly: &str,
) -> TraderRecord {
    TraderRecord {
        rank,
        name: name.to_string(),
        address: format!("0x{:040x}", rank),
        platform,
        all_time_pnl: all_time.to_string(),
        weekly_pnl: weekly.to_string(),
        monthly_pnl: monthly.to_string(),
    }
}

/// `count` traders with descending all-time PnL, all above the display
/// threshold, spread round-robin across platforms.
pub fn generated_traders(count: u32) -> Vec<TraderRecord> {
    (1..=count)
        .map(|rank| {
            let platform = Platform::ALL[(rank as usize - 1) % Platform::ALL.len()];
            let all_time = 10_000_000 - rank as i64 * 10_000;
            trader_on(
                platform,
                rank,
                &Name().fake::<String>(),
                &all_time.to_string(),
                &(all_time / 10).to_string(),
                &(all_time / 4).to_string(),
            )
        })
        .collect()
}
