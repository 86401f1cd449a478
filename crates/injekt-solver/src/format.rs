//! Type formatting for diagnostics and tracing.

use crate::intern::TypeInterner;
use crate::types::TypeId;

/// Renders types as `fq.Name<Arg, *>?`.
pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
    max_depth: u32,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        TypeFormatter {
            interner,
            max_depth: interner.options().render_depth,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.render(ty, 0, &mut out);
        out
    }

    fn render(&self, ty: TypeId, depth: u32, out: &mut String) {
        if depth > self.max_depth {
            out.push_str("...");
            return;
        }
        let data = self.interner.get(ty);
        if data.star {
            out.push('*');
            return;
        }
        out.push_str(&self.interner.fq_name(data.classifier));
        if !data.arguments.is_empty() {
            out.push('<');
            for (index, &argument) in data.arguments.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                self.render(argument, depth + 1, out);
            }
            out.push('>');
        }
        if data.nullable {
            out.push('?');
        }
    }
}

impl TypeInterner {
    pub fn render(&self, ty: TypeId) -> String {
        TypeFormatter::new(self).format(ty)
    }
}
