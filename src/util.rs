/// Checks that a numerical value lies in the closed interval `[a,b]`, returning
/// [`Error::OutOfRange`](crate::error::Error::OutOfRange) from the enclosing
/// function if not
///
/// ### Example
/// ```ignore
/// let alpha = 2.0;
/// ensure_interval!(alpha, 0.0, 1.0);
/// ```
/// This returns an error rendered as "invalid value for \`alpha\`: 2 is outside \[0, 1\]".
///
/// Prefix the lower bound with `open` to exclude it, as in `ensure_interval!(rate, open 0.0, 1.0)`.
macro_rules! ensure_interval {
    (@check $var:expr, $a:expr, $b:expr, $inclusive:expr) => {{
        let value: f64 = $var;
        let above = if $inclusive { value >= $a } else { value > $a };
        if !(above && value <= $b) {
            return Err($crate::error::Error::OutOfRange {
                name: $crate::util::field_name(stringify!($var)),
                value,
                min: $a,
                max: $b,
                min_inclusive: $inclusive,
            });
        }
    }};
    ($var:expr, open $a:expr, $b:expr) => {
        $crate::util::ensure_interval!(@check $var, $a, $b, false)
    };
    ($var:expr, $a:expr, $b:expr) => {
        $crate::util::ensure_interval!(@check $var, $a, $b, true)
    };
}

pub(crate) use ensure_interval;

/// Strip any receiver path from a stringified expression, so `config.alpha` reports as `alpha`
pub(crate) fn field_name(expr: &'static str) -> &'static str {
    expr.rsplit('.').next().unwrap_or(expr).trim()
}
