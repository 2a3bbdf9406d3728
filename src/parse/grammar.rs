use winnow::ascii::{dec_int, dec_uint, till_line_ending};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, repeat, separated};
use winnow::error::{ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::{Action, ActionKind, Condition, QuantityConstraints, Rule, Value};

use super::parser::ParsedRules;

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

// -- Words & attribute ids --------------------------------------------------

/// A bare token: keywords, rule ids and unquoted attribute ids. Ids may
/// start with a digit.
fn word<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| {
        c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
    })
    .parse_next(input)
}

fn keyword(kw: &'static str) -> impl FnMut(&mut &str) -> ModalResult<()> {
    move |input: &mut &str| word.verify(|w: &str| w == kw).void().parse_next(input)
}

fn attribute_id(input: &mut &str) -> ModalResult<String> {
    ws.parse_next(input)?;
    alt((string_literal, word.map(str::to_owned)))
        .context(expected("attribute id"))
        .parse_next(input)
}

// -- Values -----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        match any.parse_next(input)? {
            '"' => return Ok(s),
            '\\' => match any.parse_next(input)? {
                '"' => s.push('"'),
                '\\' => s.push('\\'),
                'n' => s.push('\n'),
                't' => s.push('\t'),
                other => {
                    s.push('\\');
                    s.push(other);
                }
            },
            c => s.push(c),
        }
    }
}

fn negative_number(input: &mut &str) -> ModalResult<Value> {
    let text = ('-', take_while(1.., |c: char| c.is_ascii_digit() || c == '.'))
        .take()
        .parse_next(input)?;
    if text.contains('.') {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ErrMode::from_input(input).cut())
    } else {
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ErrMode::from_input(input).cut())
    }
}

fn float_literal(input: &mut &str) -> ModalResult<f64> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        '.',
        take_while(1.., |c: char| c.is_ascii_digit()),
    )
        .take()
        .try_map(|s: &str| s.parse::<f64>())
        .parse_next(input)
}

fn value(input: &mut &str) -> ModalResult<Value> {
    ws.parse_next(input)?;
    alt((
        string_literal.map(Value::String),
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        negative_number,
        float_literal.map(Value::Float),
        dec_int::<_, i64, _>.map(Value::Int),
    ))
    .context(expected("value"))
    .parse_next(input)
}

fn value_list(input: &mut &str) -> ModalResult<Vec<Value>> {
    ws.parse_next(input)?;
    delimited(
        '[',
        separated(0.., value, (ws, ',')),
        (ws, opt(','), ws, ']'),
    )
    .context(expected("value list"))
    .parse_next(input)
}

// -- Actions ----------------------------------------------------------------

fn quantity_bound<'i>(input: &mut &'i str) -> ModalResult<(&'i str, u32)> {
    ws.parse_next(input)?;
    let bound = word
        .verify(|w: &str| matches!(w, "min" | "max" | "step"))
        .parse_next(input)?;
    ws.parse_next(input)?;
    let n = cut_err(dec_uint::<_, u32, _>)
        .context(expected("non-negative integer"))
        .parse_next(input)?;
    Ok((bound, n))
}

fn quantity_constraints(input: &mut &str) -> ModalResult<QuantityConstraints> {
    let bounds: Vec<(&str, u32)> = repeat(1.., quantity_bound)
        .context(expected("min, max or step"))
        .parse_next(input)?;
    let mut constraints = QuantityConstraints::default();
    for (bound, n) in bounds {
        match bound {
            "min" => constraints.min = Some(n),
            "max" => constraints.max = Some(n),
            _ => constraints.step = Some(n),
        }
    }
    Ok(constraints)
}

fn action(input: &mut &str) -> ModalResult<Action> {
    ws.parse_next(input)?;
    let checkpoint = input.checkpoint();
    let kind = word.parse_next(input)?;
    match kind {
        "show" => Ok(Action::show(cut_err(attribute_id).parse_next(input)?)),
        "hide" => Ok(Action::hide(cut_err(attribute_id).parse_next(input)?)),
        "show_only" => {
            let target = cut_err(attribute_id).parse_next(input)?;
            let values = cut_err(value_list).parse_next(input)?;
            Ok(Action::show_only(target, values.iter().map(Value::as_text)))
        }
        "set_default" => {
            let target = cut_err(attribute_id).parse_next(input)?;
            let default = cut_err(value).parse_next(input)?;
            Ok(Action::set_default(target, default.as_text()))
        }
        "quantity" => {
            let target = cut_err(attribute_id).parse_next(input)?;
            let constraints = cut_err(quantity_constraints).parse_next(input)?;
            Ok(Action::new(target, ActionKind::Quantity(constraints)))
        }
        _ => {
            input.reset(&checkpoint);
            Err(ErrMode::from_input(input))
        }
    }
}

// -- Rule definitions -------------------------------------------------------

fn priority_annotation(input: &mut &str) -> ModalResult<i64> {
    delimited(
        (ws, '(', ws, "priority", ws),
        cut_err(dec_int::<_, i64, _>).context(expected("priority")),
        (ws, cut_err(')')),
    )
    .parse_next(input)
}

fn rule_def(input: &mut &str) -> ModalResult<Rule> {
    ws.parse_next(input)?;
    keyword("rule").parse_next(input)?;
    ws.parse_next(input)?;

    let id = cut_err(word)
        .context(expected("rule id"))
        .parse_next(input)?;
    let name = opt(preceded(ws, string_literal)).parse_next(input)?;
    let priority = opt(priority_annotation).parse_next(input)?;

    ws.parse_next(input)?;
    cut_err(':').context(expected("`:`")).parse_next(input)?;

    ws.parse_next(input)?;
    cut_err(keyword("when"))
        .context(expected("`when`"))
        .parse_next(input)?;
    let attribute = cut_err(attribute_id).parse_next(input)?;
    ws.parse_next(input)?;
    cut_err("==").context(expected("`==`")).parse_next(input)?;
    let expected_value = cut_err(value).parse_next(input)?;

    let actions: Vec<Action> = repeat(0.., action).parse_next(input)?;

    Ok(Rule {
        id: id.to_owned(),
        name: name.unwrap_or_default(),
        condition: Some(Condition::new(attribute, expected_value)),
        actions,
        priority,
    })
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_rules(input: &mut &str) -> ModalResult<ParsedRules> {
    let rules: Vec<Rule> = repeat(0.., rule_def).parse_next(input)?;
    ws.parse_next(input)?;
    Ok(ParsedRules { rules })
}
