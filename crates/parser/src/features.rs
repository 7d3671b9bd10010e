//! Feature extraction for configuration scoring.
//!
//! The representation of a configuration is a fixed window of discrete
//! symbols: the labels and head surface forms of the two topmost stack
//! elements, and the surface forms of the two nearest buffer tokens.
//! Sentinel symbols pad an empty or short stack and buffer, so every
//! configuration yields a constant-shape symbol list.

use crate::config::Configuration;
use crate::token::Token;

/// Sentinel symbol for a missing stack element.
pub const START: &str = "#START#";
/// Sentinel symbol for an exhausted buffer.
pub const END: &str = "#END#";

/// Extract the discrete symbols describing a configuration.
pub fn extract_symbols(config: &Configuration, tokens: &[Token]) -> Vec<String> {
    let stack = &config.stack;
    let mut symbols = Vec::with_capacity(3);

    match stack.len() {
        0 => symbols.push(format!("S|{START}")),
        1 => {
            let top = &stack[0];
            symbols.push(format!("S|{}|{START}", top.label));
            symbols.push(format!("S|{}|{START}", tokens[top.head_idx].form()));
        }
        _ => {
            let top = &stack[stack.len() - 1];
            let below = &stack[stack.len() - 2];
            symbols.push(format!("S|{}|{}", top.label, below.label));
            symbols.push(format!(
                "S|{}|{}",
                tokens[top.head_idx].form(),
                tokens[below.head_idx].form()
            ));
        }
    }

    match config.buffer.as_slice() {
        [] => symbols.push(format!("B|{END}")),
        [next] => symbols.push(format!("B|{}|{END}", tokens[*next].form())),
        [next, after, ..] => symbols.push(format!(
            "B|{}|{}",
            tokens[*next].form(),
            tokens[*after].form()
        )),
    }

    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackElement;
    use lambdaqa_core::LambdaType;

    fn tokens() -> Vec<Token> {
        ["quelle", "capitale", "France"]
            .iter()
            .map(|form| Token::surface(*form, "X"))
            .collect()
    }

    #[test]
    fn test_empty_configuration_symbols() {
        let config = Configuration::initial(3);
        let symbols = extract_symbols(&config, &tokens());
        assert_eq!(symbols, vec!["S|#START#", "B|quelle|capitale"]);
    }

    #[test]
    fn test_single_stack_element() {
        let mut config = Configuration::initial(3);
        config.buffer.remove(0);
        config
            .stack
            .push(StackElement::new("WH", 0, LambdaType::boolean()));
        let symbols = extract_symbols(&config, &tokens());
        assert_eq!(
            symbols,
            vec!["S|WH|#START#", "S|quelle|#START#", "B|capitale|France"]
        );
    }

    #[test]
    fn test_full_window_and_end_sentinel() {
        let mut config = Configuration::initial(3);
        config.buffer.clear();
        config.buffer.push(2);
        config
            .stack
            .push(StackElement::new("WH", 0, LambdaType::boolean()));
        config
            .stack
            .push(StackElement::new("NC", 1, LambdaType::entity()));
        let symbols = extract_symbols(&config, &tokens());
        assert_eq!(
            symbols,
            vec!["S|NC|WH", "S|capitale|quelle", "B|France|#END#"]
        );
    }

    #[test]
    fn test_constant_shape() {
        // every configuration yields one or two stack symbols plus one
        // buffer symbol
        let config = Configuration::initial(0);
        let symbols = extract_symbols(&config, &[]);
        assert_eq!(symbols, vec!["S|#START#", "B|#END#"]);
    }
}
