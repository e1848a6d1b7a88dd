// src/main.rs
use refa::fa::{CaptureGroupContext, ParseContext, lex};
use refa::re::RegexExpr;

fn main() -> anyhow::Result<()> {
    // A small sample: find key=value pairs and report the named captures.
    let pattern = r"(?<key>[A-Za-z_]\w*)=(?<value>\d+)";
    let src = "width=1920 height=1080 label=x3";

    let expr = RegexExpr::parse(pattern)?;
    println!("pattern: {expr}");

    let fa = expr.to_fa(0u32);
    let mut ctx = ParseContext::from_text(src);
    let mut captures = CaptureGroupContext::new();
    while let Some(m) = fa.search_nfa(&mut ctx, &mut captures, false) {
        println!(
            "{}:{} @{} {:?}  key={:?} value={:?}",
            m.line,
            m.column,
            m.position,
            m.value,
            m.named_capture("key"),
            m.named_capture("value"),
        );
        captures.clear();
    }

    // The same engine family, precompiled for scanning: ident / int / white.
    let tokens = RegexExpr::parse(r"[A-Za-z_]\w*")?
        .to_fa(0u32)
        .union(RegexExpr::parse(r"\d+")?.to_fa(1u32))
        .union(RegexExpr::parse(r"[ \t\r\n]+")?.to_fa(2u32));
    let dfa = tokens.to_dfa();
    let table = dfa.to_dfa_table(&[0, 1, 2]);

    const NAMES: [&str; 4] = ["ident", "int", "white", "error"];
    let mut ctx = ParseContext::from_text("foo = 12 + bar9");
    println!("TOKENS:");
    for token in lex(&table, &mut ctx, 3) {
        println!("{}  {:?}", NAMES[token.symbol_id as usize], token.value);
    }
    Ok(())
}
