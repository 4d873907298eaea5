// Random feed generator, for demos and load tests against the importer

use rand::Rng;
use std::fmt::Write;

pub const DEFAULT_COUNT: usize = 100;

/// Render `count` random `Product <n>;<price>` rows.
///
/// Product numbers are drawn from `0..count`, so larger feeds repeat names and
/// exercise the change counter.
pub fn generate_feed<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    let mut feed = String::with_capacity(count * 20);

    for _ in 0..count {
        let scale = rng.gen_range(0..count) as f64;
        let price = rng.gen::<f64>() * scale;
        let product = rng.gen_range(0..count);
        // Writing to a String cannot fail
        let _ = writeln!(feed, "Product {};{:.2}", product, price);
    }

    feed
}
