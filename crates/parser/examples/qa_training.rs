//! Train the semantic parser on a toy geography corpus and answer
//! questions against the in-memory knowledge base.
//!
//! Run with: cargo run --example qa_training

use lambdaqa_core::NamingContext;
use lambdaqa_kb::{KbExecutor, KbModel};
use lambdaqa_parser::{Example, Token, TrainerConfig, TransitionParser};
use lambdaqa_syntax::TermParser;

fn kb_token(form: &str, pos: &str, macro_name: &str) -> Token {
    let context = NamingContext::kb_builtins();
    Token::new(
        form,
        pos,
        Some(macro_name.to_string()),
        context.lookup(macro_name),
    )
}

fn wh_token(form: &str) -> Token {
    let term = TermParser::new(NamingContext::kb_builtins())
        .parse_code("(lambda (P:e=>t) (@exists (x:e) (P x)))")
        .expect("wh-term parses")
        .expect("wh-term is a term");
    Token::new(form, "WH", None, Some(term))
}

fn question(entity_form: &str, entity_id: &str, answer: &str) -> Example {
    Example {
        tokens: vec![
            wh_token("quelle"),
            kb_token("capitale", "NC", "P36"),
            kb_token(entity_form, "NPP", entity_id),
        ],
        reference: vec![answer.to_string()],
    }
}

fn main() {
    env_logger::init();

    let executor = KbExecutor::new(KbModel::toy_geography());
    let train_data = vec![
        question("France", "Q142", "Q90"),
        question("Allemagne", "Q183", "Q64"),
    ];
    let held_out = question("Italie", "Q38", "Q220");

    let mut parser = TransitionParser::new().expect("standard catalogue builds");
    let config = TrainerConfig {
        learning_rate: 0.5,
        epochs: 5,
        beam_width: 16,
    };

    println!("=== Training ===");
    let history = parser.train(&train_data, &config, &executor);
    for (epoch, ll) in history.iter().enumerate() {
        println!("epoch {epoch}: log-likelihood = {ll:.4}");
    }
    println!("learned {} features\n", parser.weights().len());

    println!("=== Questions ===");
    for example in train_data.iter().chain(std::iter::once(&held_out)) {
        let forms: Vec<&str> = example.tokens.iter().map(|t| t.form()).collect();
        let answer = parser.best_answer(config.beam_width, &example.tokens, &executor);
        println!(
            "{} ? -> {:?} (expected {:?})",
            forms.join(" "),
            answer,
            example.reference
        );
    }

    let weights = serde_json::to_string(parser.weights()).expect("weights serialize");
    println!("\nmodel size: {} bytes of JSON", weights.len());
}
