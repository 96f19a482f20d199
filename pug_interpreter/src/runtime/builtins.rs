//! Registry of native functions callable from scripts.
//!
//! Every entry declares an [`Arity`] that is checked before dispatch, so
//! implementations can index their argument slice directly.

use super::{Host, RuntimeValue, ValueError};
use crate::config::compile_time::runtime::MAX_ROUND_DIGITS;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Accepted argument counts for a built-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Inclusive on both ends
    Range { min: usize, max: usize },
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => *n == count,
            Arity::Range { min, max } => (*min..=*max).contains(&count),
        }
    }

    pub fn max(&self) -> usize {
        match self {
            Arity::Exact(n) => *n,
            Arity::Range { max, .. } => *max,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Arity::Exact(1) => "1 argument".to_string(),
            Arity::Exact(n) => format!("{} arguments", n),
            Arity::Range { min, max } => format!("{}..={} arguments", min, max),
        }
    }
}

pub type NativeFn = fn(&[RuntimeValue], &mut dyn Host) -> Result<RuntimeValue, ValueError>;

struct BuiltIn {
    arity: Arity,
    function: NativeFn,
}

static REGISTRY: OnceLock<HashMap<&'static str, BuiltIn>> = OnceLock::new();

fn registry() -> &'static HashMap<&'static str, BuiltIn> {
    REGISTRY.get_or_init(|| {
        let mut functions = HashMap::new();
        let mut register = |name: &'static str, arity: Arity, function: NativeFn| {
            functions.insert(name, BuiltIn { arity, function });
        };

        // Math
        register("sqrt", Arity::Exact(1), sqrt);
        register("pow", Arity::Range { min: 1, max: 2 }, pow);
        register("min", Arity::Exact(2), min);
        register("max", Arity::Exact(2), max);
        register("round", Arity::Range { min: 1, max: 2 }, round);
        register("random", Arity::Range { min: 0, max: 2 }, random);

        // Strings
        register("len", Arity::Exact(1), len);
        register("upper", Arity::Exact(1), upper);
        register("lower", Arity::Exact(1), lower);
        register("replace", Arity::Exact(3), replace);
        register("substr", Arity::Range { min: 2, max: 3 }, substr);
        register("left", Arity::Exact(2), left);
        register("right", Arity::Exact(2), right);
        register("mid", Arity::Exact(3), mid);
        register("trim", Arity::Exact(1), trim);
        register("trim_start", Arity::Exact(1), trim_start);
        register("trim_end", Arity::Exact(1), trim_end);
        register("char_at", Arity::Exact(2), char_at);

        // Conversions
        register("to_str", Arity::Exact(1), to_str);
        register("to_int", Arity::Exact(1), to_int);
        register("to_double", Arity::Exact(1), to_double);
        register("to_bool", Arity::Exact(1), to_bool);

        // Control and host I/O
        register("iif", Arity::Exact(3), iif);
        register("print", Arity::Exact(1), print);
        register("read", Arity::Exact(0), read);
        register("clear", Arity::Exact(0), clear);

        functions
    })
}

/// Name-keyed access to the native function table
pub struct BuiltInFunctions;

impl BuiltInFunctions {
    pub fn contains(name: &str) -> bool {
        registry().contains_key(name)
    }

    pub fn arity(name: &str) -> Option<Arity> {
        registry().get(name).map(|builtin| builtin.arity)
    }

    /// Registered names in alphabetical order
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = registry().keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn invoke(
        name: &str,
        args: &[RuntimeValue],
        host: &mut dyn Host,
    ) -> Result<RuntimeValue, ValueError> {
        let builtin = registry()
            .get(name)
            .ok_or_else(|| ValueError::FunctionNotFound {
                name: name.to_string(),
            })?;

        if !builtin.arity.accepts(args.len()) {
            return Err(ValueError::InvalidArgumentCount {
                name: name.to_string(),
            });
        }

        (builtin.function)(args, host)
    }
}

fn sqrt(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Double(args[0].to_double()?.sqrt()))
}

fn pow(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let base = args[0].to_double()?;
    let exponent = match args.get(1) {
        Some(exponent) => exponent.to_double()?,
        None => 2.0,
    };
    Ok(RuntimeValue::Double(base.powf(exponent)))
}

fn min(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Double(
        args[0].to_double()?.min(args[1].to_double()?),
    ))
}

fn max(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Double(
        args[0].to_double()?.max(args[1].to_double()?),
    ))
}

fn round(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let value = args[0].to_double()?;
    let Some(digits) = args.get(1) else {
        return Ok(RuntimeValue::Double(value.round_ties_even()));
    };

    let digits = digits.to_int()?;
    if !(0..=i64::from(MAX_ROUND_DIGITS)).contains(&digits) {
        return Err(ValueError::invalid_argument(
            "round",
            format!("digits must be between 0 and {}", MAX_ROUND_DIGITS),
        ));
    }

    let scale = 10f64.powi(digits as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return Ok(RuntimeValue::Double(value));
    }
    Ok(RuntimeValue::Double(scaled.round_ties_even() / scale))
}

fn random(args: &[RuntimeValue], host: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    match args {
        [] => Ok(RuntimeValue::Double(host.random_unit())),
        [upper] => {
            let upper = upper.to_int()?;
            if upper < 0 {
                return Err(ValueError::invalid_argument(
                    "random",
                    "upper bound must not be negative",
                ));
            }
            Ok(RuntimeValue::Double(host.random_range(0, upper) as f64))
        }
        [lower, upper, ..] => {
            let (lower, upper) = (lower.to_int()?, upper.to_int()?);
            if lower > upper {
                return Err(ValueError::invalid_argument(
                    "random",
                    format!("lower bound {} is greater than upper bound {}", lower, upper),
                ));
            }
            Ok(RuntimeValue::Double(host.random_range(lower, upper) as f64))
        }
    }
}

fn len(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Int(args[0].to_string().chars().count() as i64))
}

fn upper(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    RuntimeValue::checked_str(args[0].to_string().to_uppercase())
}

fn lower(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    RuntimeValue::checked_str(args[0].to_string().to_lowercase())
}

fn replace(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let search = args[1].to_string();
    if search.is_empty() {
        return Err(ValueError::invalid_argument(
            "replace",
            "search string must not be empty",
        ));
    }
    let text = args[0].to_string();
    RuntimeValue::checked_str(text.replace(&search, &args[2].to_string()))
}

fn substr(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let chars: Vec<char> = args[0].to_string().chars().collect();
    let start = args[1].to_int()?;
    if start < 0 || start as usize > chars.len() {
        return Err(ValueError::invalid_argument(
            "substr",
            format!("start index {} is outside a string of length {}", start, chars.len()),
        ));
    }
    let start = start as usize;

    let end = match args.get(2) {
        Some(length) => {
            let length = length.to_int()?;
            if length < 0 || start + length as usize > chars.len() {
                return Err(ValueError::invalid_argument(
                    "substr",
                    format!(
                        "length {} from index {} exceeds a string of length {}",
                        length,
                        start,
                        chars.len()
                    ),
                ));
            }
            start + length as usize
        }
        None => chars.len(),
    };

    Ok(RuntimeValue::Str(chars[start..end].iter().collect()))
}

/// Clamp a possibly negative count to `0..=limit`
fn clamp_index(value: i64, limit: usize) -> usize {
    value.clamp(0, limit as i64) as usize
}

fn left(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let chars: Vec<char> = args[0].to_string().chars().collect();
    let count = clamp_index(args[1].to_int()?, chars.len());
    Ok(RuntimeValue::Str(chars[..count].iter().collect()))
}

fn right(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let chars: Vec<char> = args[0].to_string().chars().collect();
    let count = clamp_index(args[1].to_int()?, chars.len());
    Ok(RuntimeValue::Str(chars[chars.len() - count..].iter().collect()))
}

fn mid(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let chars: Vec<char> = args[0].to_string().chars().collect();
    let start = clamp_index(args[1].to_int()?, chars.len());
    let length = clamp_index(args[2].to_int()?, chars.len() - start);
    Ok(RuntimeValue::Str(chars[start..start + length].iter().collect()))
}

fn trim(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Str(args[0].to_string().trim().to_string()))
}

fn trim_start(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Str(args[0].to_string().trim_start().to_string()))
}

fn trim_end(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Str(args[0].to_string().trim_end().to_string()))
}

fn char_at(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let text = args[0].to_string();
    let index = args[1].to_int()?;
    usize::try_from(index)
        .ok()
        .and_then(|index| text.chars().nth(index))
        .map(|c| RuntimeValue::Str(c.to_string()))
        .ok_or_else(|| {
            ValueError::invalid_argument(
                "char_at",
                format!(
                    "index {} is outside a string of length {}",
                    index,
                    text.chars().count()
                ),
            )
        })
}

fn to_str(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Str(args[0].to_string()))
}

fn to_int(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Int(args[0].to_int()?))
}

fn to_double(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Double(args[0].to_double()?))
}

fn to_bool(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    Ok(RuntimeValue::Bool(args[0].to_bool()?))
}

fn iif(args: &[RuntimeValue], _: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    let RuntimeValue::Bool(condition) = args[0] else {
        return Err(ValueError::invalid_argument(
            "iif",
            format!("condition must be a Bool, found {}", args[0].data_type()),
        ));
    };

    let (when_true, when_false) = (&args[1], &args[2]);
    let same_family = (when_true.is_number() && when_false.is_number())
        || when_true.data_type() == when_false.data_type();
    if !same_family {
        return Err(ValueError::invalid_argument(
            "iif",
            format!(
                "branches must share a type, found {} and {}",
                when_true.data_type(),
                when_false.data_type()
            ),
        ));
    }

    Ok(if condition {
        when_true.clone()
    } else {
        when_false.clone()
    })
}

fn print(args: &[RuntimeValue], host: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    host.print_line(&args[0].to_string())?;
    Ok(RuntimeValue::None)
}

fn read(_: &[RuntimeValue], host: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    RuntimeValue::checked_str(host.read_line()?)
}

fn clear(_: &[RuntimeValue], host: &mut dyn Host) -> Result<RuntimeValue, ValueError> {
    host.clear()?;
    Ok(RuntimeValue::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryHost;
    use assert_matches::assert_matches;

    fn call(name: &str, args: &[RuntimeValue]) -> Result<RuntimeValue, ValueError> {
        BuiltInFunctions::invoke(name, args, &mut MemoryHost::with_seed(42))
    }

    fn s(text: &str) -> RuntimeValue {
        RuntimeValue::Str(text.to_string())
    }

    fn d(value: f64) -> RuntimeValue {
        RuntimeValue::Double(value)
    }

    fn i(value: i64) -> RuntimeValue {
        RuntimeValue::Int(value)
    }

    #[test]
    fn test_registry_lookup() {
        assert!(BuiltInFunctions::contains("sqrt"));
        assert!(BuiltInFunctions::contains("char_at"));
        assert!(!BuiltInFunctions::contains("printf"));
        assert_eq!(
            BuiltInFunctions::arity("pow"),
            Some(Arity::Range { min: 1, max: 2 })
        );

        let names = BuiltInFunctions::names();
        assert_eq!(names.len(), 26);
        assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_unknown_function_and_arity() {
        assert_eq!(
            call("nope", &[]).unwrap_err().to_string(),
            "Function nope not found"
        );
        assert_eq!(
            call("sqrt", &[]).unwrap_err().to_string(),
            "Invalid number of arguments for sqrt"
        );
        assert_eq!(
            call("random", &[d(1.0), d(2.0), d(3.0)]).unwrap_err().to_string(),
            "Invalid number of arguments for random"
        );
    }

    #[test]
    fn test_arity_describe() {
        assert!(Arity::Range { min: 0, max: 2 }.accepts(0));
        assert!(!Arity::Exact(2).accepts(3));
        assert_eq!(Arity::Exact(1).describe(), "1 argument");
        assert_eq!(Arity::Range { min: 2, max: 3 }.describe(), "2..=3 arguments");
    }

    #[test]
    fn test_math() {
        assert_eq!(call("sqrt", &[d(16.0)]), Ok(d(4.0)));
        assert_eq!(call("pow", &[d(3.0)]), Ok(d(9.0)));
        assert_eq!(call("pow", &[i(2), d(10.0)]), Ok(d(1024.0)));
        assert_eq!(call("min", &[i(3), d(1.5)]), Ok(d(1.5)));
        assert_eq!(call("max", &[i(3), d(1.5)]), Ok(d(3.0)));
        assert_eq!(call("sqrt", &[s("9")]), Ok(d(3.0)));
        assert_matches!(call("sqrt", &[d(-1.0)]), Ok(RuntimeValue::Double(v)) if v.is_nan());
        assert_eq!(
            call("sqrt", &[s("abc")]).unwrap_err().to_string(),
            "Can't convert abc to double"
        );
    }

    #[test]
    fn test_round() {
        assert_eq!(call("round", &[d(2.5)]), Ok(d(2.0)));
        assert_eq!(call("round", &[d(3.5)]), Ok(d(4.0)));
        assert_eq!(call("round", &[d(3.14159), i(2)]), Ok(d(3.14)));
        assert_matches!(
            call("round", &[d(1.0), i(-1)]),
            Err(ValueError::InvalidArgument { name: "round", .. })
        );
    }

    #[test]
    fn test_random() {
        let mut host = MemoryHost::with_seed(3);
        for _ in 0..50 {
            let RuntimeValue::Double(unit) =
                BuiltInFunctions::invoke("random", &[], &mut host).unwrap()
            else {
                panic!("random() must return a Double");
            };
            assert!((0.0..1.0).contains(&unit));

            let RuntimeValue::Double(ranged) =
                BuiltInFunctions::invoke("random", &[i(5), i(10)], &mut host).unwrap()
            else {
                panic!("random(m, n) must return a Double");
            };
            assert!((5.0..10.0).contains(&ranged));
            assert_eq!(ranged.fract(), 0.0);
        }

        assert_eq!(call("random", &[i(0)]), Ok(d(0.0)));
        assert_eq!(call("random", &[i(4), i(4)]), Ok(d(4.0)));
        assert_matches!(call("random", &[i(-1)]), Err(ValueError::InvalidArgument { .. }));
        assert_matches!(
            call("random", &[i(9), i(2)]),
            Err(ValueError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(call("len", &[s("çafé")]), Ok(i(4)));
        assert_eq!(call("len", &[d(15.0)]), Ok(i(2)));
        assert_eq!(call("upper", &[s("Pug")]), Ok(s("PUG")));
        assert_eq!(call("lower", &[s("Pug")]), Ok(s("pug")));
        assert_eq!(call("replace", &[s("a-b-c"), s("-"), s("+")]), Ok(s("a+b+c")));
        assert_matches!(
            call("replace", &[s("abc"), s(""), s("x")]),
            Err(ValueError::InvalidArgument { .. })
        );
        assert_eq!(call("trim", &[s("  x  ")]), Ok(s("x")));
        assert_eq!(call("trim_start", &[s("  x  ")]), Ok(s("x  ")));
        assert_eq!(call("trim_end", &[s("  x  ")]), Ok(s("  x")));
    }

    #[test]
    fn test_substr_is_strict() {
        assert_eq!(call("substr", &[s("hello"), i(1)]), Ok(s("ello")));
        assert_eq!(call("substr", &[s("hello"), i(1), i(3)]), Ok(s("ell")));
        assert_eq!(call("substr", &[s("hello"), i(5)]), Ok(s("")));
        assert_matches!(
            call("substr", &[s("hello"), i(6)]),
            Err(ValueError::InvalidArgument { name: "substr", .. })
        );
        assert_matches!(
            call("substr", &[s("hello"), i(2), i(4)]),
            Err(ValueError::InvalidArgument { name: "substr", .. })
        );
    }

    #[test]
    fn test_left_right_mid_clamp() {
        assert_eq!(call("left", &[s("hello"), i(2)]), Ok(s("he")));
        assert_eq!(call("left", &[s("hello"), i(99)]), Ok(s("hello")));
        assert_eq!(call("left", &[s("hello"), i(-1)]), Ok(s("")));
        assert_eq!(call("right", &[s("hello"), i(3)]), Ok(s("llo")));
        assert_eq!(call("right", &[s("hello"), i(99)]), Ok(s("hello")));
        assert_eq!(call("mid", &[s("hello"), i(1), i(3)]), Ok(s("ell")));
        assert_eq!(call("mid", &[s("hello"), i(3), i(99)]), Ok(s("lo")));
        assert_eq!(call("mid", &[s("hello"), i(9), i(2)]), Ok(s("")));
    }

    #[test]
    fn test_char_at() {
        assert_eq!(call("char_at", &[s("pug"), i(1)]), Ok(s("u")));
        assert_matches!(
            call("char_at", &[s("pug"), i(3)]),
            Err(ValueError::InvalidArgument { name: "char_at", .. })
        );
        assert_matches!(
            call("char_at", &[s("pug"), i(-1)]),
            Err(ValueError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(call("to_str", &[d(2.5)]), Ok(s("2.5")));
        assert_eq!(call("to_int", &[s("12")]), Ok(i(12)));
        assert_eq!(call("to_int", &[d(2.5)]), Ok(i(2)));
        assert_eq!(call("to_double", &[s("1.5")]), Ok(d(1.5)));
        assert_eq!(call("to_bool", &[s("True")]), Ok(RuntimeValue::Bool(true)));
        assert_eq!(
            call("to_int", &[s("x")]).unwrap_err().to_string(),
            "Can't convert x to int"
        );
    }

    #[test]
    fn test_iif() {
        let yes = RuntimeValue::Bool(true);
        let no = RuntimeValue::Bool(false);
        assert_eq!(call("iif", &[yes.clone(), s("a"), s("b")]), Ok(s("a")));
        assert_eq!(call("iif", &[no, i(1), d(2.0)]), Ok(d(2.0)));
        assert_matches!(
            call("iif", &[i(1), s("a"), s("b")]),
            Err(ValueError::InvalidArgument { name: "iif", .. })
        );
        assert_matches!(
            call("iif", &[yes, s("a"), i(1)]),
            Err(ValueError::InvalidArgument { name: "iif", .. })
        );
    }

    #[test]
    fn test_host_functions() {
        let mut host = MemoryHost::new().with_input(["typed"]);
        assert_eq!(
            BuiltInFunctions::invoke("print", &[d(15.0)], &mut host),
            Ok(RuntimeValue::None)
        );
        assert_eq!(
            BuiltInFunctions::invoke("read", &[], &mut host),
            Ok(s("typed"))
        );
        assert_eq!(
            BuiltInFunctions::invoke("clear", &[], &mut host),
            Ok(RuntimeValue::None)
        );
        assert_eq!(host.output(), ["15".to_string()]);
        assert_eq!(host.clear_count(), 1);
    }
}
