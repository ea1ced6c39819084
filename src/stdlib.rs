//! Optional prelude of host functions.
//!
//! Nothing here is bound unless the host asks for it; the command line front
//! end installs it by default.

use crate::{
    diagnostics::{Diagnostic, Result},
    environment::Environment,
    value::{Value, ValueKind},
};

pub fn prelude() -> Environment {
    let mut env = Environment::new();
    install(&mut env);
    env
}

pub fn install(env: &mut Environment) {
    env.define("abs", native("abs", 1, math_abs))
        .define("floor", native("floor", 1, math_floor))
        .define("ceil", native("ceil", 1, math_ceil))
        .define("sqrt", native("sqrt", 1, math_sqrt))
        .define("min", Value::function("min", math_min))
        .define("max", Value::function("max", math_max))
        .define("len", native("len", 1, string_len))
        .define("upper", native("upper", 1, string_upper))
        .define("lower", native("lower", 1, string_lower))
        .define("trim", native("trim", 1, string_trim))
        .define("str", native("str", 1, convert_str))
        .define("num", native("num", 1, convert_num));
}

fn native(name: &'static str, arity: usize, callback: fn(&[Value]) -> Result<Value>) -> Value {
    Value::function_with_arity(name, arity, callback)
}

fn math_abs(args: &[Value]) -> Result<Value> {
    Ok(Value::number(expect_number("abs", &args[0])?.abs()))
}

fn math_floor(args: &[Value]) -> Result<Value> {
    Ok(Value::number(expect_number("floor", &args[0])?.floor()))
}

fn math_ceil(args: &[Value]) -> Result<Value> {
    Ok(Value::number(expect_number("ceil", &args[0])?.ceil()))
}

fn math_sqrt(args: &[Value]) -> Result<Value> {
    Ok(Value::number(expect_number("sqrt", &args[0])?.sqrt()))
}

fn math_min(args: &[Value]) -> Result<Value> {
    fold_numbers("min", args, f64::min)
}

fn math_max(args: &[Value]) -> Result<Value> {
    fold_numbers("max", args, f64::max)
}

fn fold_numbers(name: &str, args: &[Value], pick: fn(f64, f64) -> f64) -> Result<Value> {
    let (first, rest) = args.split_first().ok_or_else(|| {
        Diagnostic::runtime(format!("function `{name}` expects at least one argument"))
    })?;
    let mut acc = expect_number(name, first)?;
    for value in rest {
        acc = pick(acc, expect_number(name, value)?);
    }
    Ok(Value::number(acc))
}

fn string_len(args: &[Value]) -> Result<Value> {
    let text = expect_string("len", &args[0])?;
    Ok(Value::number(text.chars().count() as f64))
}

fn string_upper(args: &[Value]) -> Result<Value> {
    Ok(Value::string(expect_string("upper", &args[0])?.to_uppercase()))
}

fn string_lower(args: &[Value]) -> Result<Value> {
    Ok(Value::string(expect_string("lower", &args[0])?.to_lowercase()))
}

fn string_trim(args: &[Value]) -> Result<Value> {
    Ok(Value::string(expect_string("trim", &args[0])?.trim()))
}

fn convert_str(args: &[Value]) -> Result<Value> {
    match &*args[0].0 {
        ValueKind::String(_) => Ok(args[0].clone()),
        _ => Ok(Value::string(args[0].to_string())),
    }
}

fn convert_num(args: &[Value]) -> Result<Value> {
    match &*args[0].0 {
        ValueKind::Number(_) => Ok(args[0].clone()),
        ValueKind::String(text) => text.trim().parse::<f64>().map(Value::number).map_err(|_| {
            Diagnostic::runtime(format!("function `num` cannot parse `{text}` as a number"))
                .into()
        }),
        _ => Err(Diagnostic::runtime(format!(
            "function `num` expects String or Number, found {}",
            args[0].type_name()
        ))
        .into()),
    }
}

fn expect_number(name: &str, value: &Value) -> Result<f64> {
    value.as_number().ok_or_else(|| {
        Diagnostic::runtime(format!(
            "function `{name}` expects Number, found {}",
            value.type_name()
        ))
        .into()
    })
}

fn expect_string<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Diagnostic::runtime(format!(
            "function `{name}` expects String, found {}",
            value.type_name()
        ))
        .into()
    })
}
