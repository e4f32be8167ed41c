/*!
A bidirectional datetime template engine with constant-time calendar
arithmetic.

The two halves of this crate:

* The [`template`] module: templates built from ordered
  [`Placeholder`](template::Placeholder)s and literal
  [`Separator`](template::Separator)s that both **parse** a string into a
  typed field [`Record`](template::Record) and **format** a record back
  into a string, with position-accurate errors, symmetric range checks
  and duplicate-field conflict detection.
* The [`civil`] module and the [`DateTime`] aggregate: Gregorian and ISO
  week-numbering calendar fields computed from a millisecond timestamp in
  constant time via nested leap cycle decomposition, with no stored state
  beyond the timestamp and a time zone offset.

[`fmt`] ties them together: a token vocabulary (`yyyy`, `MMM`, `HH`, ...)
resolved against locale name tables into templates that parse and format
[`DateTime`] values.

# Examples

Round-trip a datetime through its canonical ISO-8601 form:

```
use timeform::DateTime;

let dt: DateTime = "2025-12-01T22:54:12,543+00:00".parse()?;
assert_eq!(dt.year(), 2025);
assert_eq!(dt.iso_week(), 49);
assert_eq!(dt.to_string(), "2025-12-01T22:54:12,543+00:00");

# Ok::<(), timeform::Error>(())
```

Parse and re-format a custom pattern with month names:

```
use timeform::fmt::{Context, DateTimeFormat};

let context = Context::from_locale("en").expect("built-in locale");
let format = DateTimeFormat::new(&context, "MMM d, yyyy HH:mm")?;
let dt = format.parse("Apr 1, 2022 20:46")?;
assert_eq!(format.format(&dt)?, "Apr 1, 2022 20:46");

# Ok::<(), timeform::Error>(())
```

Or build a template directly:

```
use timeform::template::{
    options::NumericFormatOptions, Placeholder, Separator, Template,
};

let opts = NumericFormatOptions::new();
let template = Template::new(vec![
    Placeholder::fixed_numeric("day", 2, '0', opts).with_label("dd").into(),
    Separator::new("/").into(),
    Placeholder::fixed_numeric("month", 2, '0', opts).with_label("MM").into(),
]);
let record = template.parse("25/12")?;
assert_eq!(record.int("day"), Some(25));

# Ok::<(), timeform::Error>(())
```

# Crate features

* `logging`: emits trace-level diagnostics through the `log` crate.
* `serde`: `Serialize`/`Deserialize` for [`DateTime`] via its canonical
  ISO-8601 string.
*/

#![deny(rustdoc::broken_intra_doc_links)]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

pub use crate::{
    datetime::{DateTime, Parts},
    error::Error,
};

#[macro_use]
mod logging;
#[macro_use]
mod error;

pub mod civil;
mod datetime;
pub mod fmt;
pub mod template;
mod util;
