use lp_tracker::libraries::tick_math;

fn main() {
    let args: Vec<_> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: tick_to_sqrtx96 <tick>");
        std::process::exit(1);
    }

    let tick: i32 = args[1].parse().expect("expected a tick index");

    let sqrt_x96 = tick_math::get_sqrt_ratio_at_tick(tick).expect("tick out of bounds");

    println!("sqrt_x96 price at tick {} is {}", tick, sqrt_x96);
}
