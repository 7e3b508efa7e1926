use std::hash::BuildHasherDefault;
use std::hash::DefaultHasher;

use chain_hash::GrowthPolicy;
use chain_hash::HashMap;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "entries", default_value_t = 1000)]
    entries: u64,
    #[arg(short = 'l', long = "load_factor", default_value_t = 3.0)]
    load_factor: f32,
    #[arg(short = 'd', long = "doubling")]
    doubling: bool,
}

fn main() {
    let args = Args::parse();
    let growth = if args.doubling {
        GrowthPolicy::Doubling
    } else {
        GrowthPolicy::Linear
    };

    let mut map: HashMap<u64, u64, BuildHasherDefault<DefaultHasher>> = HashMap::new();
    if let Err(err) = map.set_max_load_factor(args.load_factor) {
        eprintln!("error: {err}");
        std::process::exit(2);
    }
    map.set_growth_policy(growth);

    println!(
        "Filling map with {} entries ({:?} growth, max load factor {})",
        args.entries, growth, args.load_factor
    );

    let mut growth_events = 0;
    let mut buckets = map.bucket_count();
    for i in 0..args.entries {
        map.insert(i, i * i);
        if map.bucket_count() != buckets {
            growth_events += 1;
            buckets = map.bucket_count();
        }
    }

    println!("Inserted {} entries", map.len());
    println!("Growth events: {}", growth_events);
    println!("Final bucket count: {}", map.bucket_count());
    println!("Final load factor: {:.3}", map.load_factor());

    map.stats().print();
}
