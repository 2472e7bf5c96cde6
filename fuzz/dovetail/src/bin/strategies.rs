use fuzz_dovetail::{check_bytes, check_strategies, Input};

fn main() {
    afl::fuzz!(|data: Input| {
        let text = data.text();
        check_strategies(&text);
        check_bytes(&text);
    });
}
