use std::collections::HashMap;
use std::iter;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use super::labels::{LabelGen, LabelTable};
use super::macros::Macro;
use super::{arith, control, namespace, stack, CodegenError, Config, MAX_CALL_ARGS};
use crate::ir::{is_identifier, Opcode};

static MACRO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]+$").expect("macro name regex"));

static LOCAL_LABEL_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*:(\.[A-Za-z_][A-Za-z0-9_]*)\s*$").expect("local label regex")
});

static LOCAL_LABEL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Za-z_][A-Za-z0-9_]*").expect("label reference regex"));

/// Expands macro templates into plain sed commands.
///
/// Local labels (`:.name`) are renamed to `lbl<N>` each time a template is
/// expanded, and every `CALL_FUNCTION` gets its own `ret<N>` resumption
/// label. Both counters belong to the expander, so two expanders never
/// influence each other.
#[derive(Debug)]
pub struct Expander {
    config: Config,
    locals: LabelGen,
    return_labels: LabelGen,
    functions: LabelTable,
    returns: LabelTable,
}

impl Expander {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            locals: LabelGen::new("lbl"),
            return_labels: LabelGen::new("ret"),
            functions: LabelTable::new(),
            returns: LabelTable::new(),
        }
    }

    /// Make `name` a target for dynamic calls and a direct branch for static ones.
    pub fn register_function(&mut self, name: &str) {
        self.functions.insert(name);
    }

    pub fn functions(&self) -> &LabelTable {
        &self.functions
    }

    /// Resumption labels issued so far, in call-site order.
    pub fn returns(&self) -> &LabelTable {
        &self.returns
    }

    pub fn local_labels_issued(&self) -> usize {
        self.locals.issued()
    }

    /// Expand every macro line of `text`; other lines pass through trimmed.
    pub fn expand(&mut self, text: &str) -> Result<String, CodegenError> {
        let text = self.freshen(text);
        let mut out = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let head = tokens.next().unwrap_or_default();
            if MACRO_NAME.is_match(head) {
                let mac: Macro = head.parse().map_err(CodegenError::UnknownMacro)?;
                let args: Vec<&str> = tokens.take_while(|tok| !tok.starts_with('#')).collect();
                out.push_str(&self.invoke(mac, &args)?);
            } else {
                out.push_str(&line.replace(r"\d", "[0-9]"));
                out.push('\n');
            }
        }

        Ok(out)
    }

    /// Expand a single macro with already-split arguments.
    pub fn invoke(&mut self, mac: Macro, args: &[&str]) -> Result<String, CodegenError> {
        let expected = mac.arity();
        if !expected.accepts(args.len()) {
            return Err(CodegenError::Arity {
                name: mac.name().to_string(),
                expected,
                found: args.len(),
            });
        }
        trace!(name = mac.name(), ?args, "expanding macro");

        let body = self.body(mac, args)?;
        self.expand(&body)
    }

    /// Epilogue branched to by `RETURN_VALUE`: PS holds the label to resume at.
    pub fn return_dispatch(&mut self) -> Result<String, CodegenError> {
        let labels: Vec<String> = self
            .returns
            .iter()
            .chain(iter::once("end_of_script"))
            .map(str::to_string)
            .collect();
        let body = control::dispatch(labels.iter().map(String::as_str));
        self.expand(&body)
    }

    fn freshen(&mut self, text: &str) -> String {
        let mut renames: HashMap<&str, String> = HashMap::new();
        for caps in LOCAL_LABEL_DECL.captures_iter(text) {
            if let Some(decl) = caps.get(1) {
                let locals = &mut self.locals;
                renames.entry(decl.as_str()).or_insert_with(|| locals.fresh());
            }
        }
        if renames.is_empty() {
            return text.to_string();
        }

        LOCAL_LABEL_REF
            .replace_all(text, |caps: &Captures| match renames.get(&caps[0]) {
                Some(fresh) => fresh.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    fn body(&mut self, mac: Macro, args: &[&str]) -> Result<String, CodegenError> {
        let text = match mac {
            Macro::Startup => namespace::STARTUP.to_string(),
            Macro::Push => stack::PUSH.to_string(),
            Macro::Pop => stack::POP.to_string(),
            Macro::Push2 => stack::PUSH2.to_string(),
            Macro::Pop2 => stack::POP2.to_string(),
            Macro::Swap => stack::SWAP.to_string(),
            Macro::FullAdd => arith::full_add(),
            Macro::FullSub => arith::full_sub(),
            Macro::FullMul => arith::full_mul(),
            Macro::UAdd => arith::UADD.to_string(),
            Macro::USub => arith::USUB.to_string(),
            Macro::UMul => arith::UMUL.to_string(),
            Macro::MulByDigit => arith::MULBYDIGIT.to_string(),
            Macro::Cmp => arith::cmp(),
            Macro::SCmp => arith::SCMP.to_string(),
            Macro::SAdd => arith::SADD.to_string(),
            Macro::SSub => arith::SSUB.to_string(),
            Macro::SMul => arith::SMUL.to_string(),
            Macro::Negative => arith::NEGATIVE.to_string(),
            Macro::Odd => arith::odd(),
            Macro::DivBy2 => arith::divby2(),
            Macro::Op(opcode) => self.opcode_body(opcode, args)?,
        };
        Ok(text)
    }

    fn opcode_body(&mut self, opcode: Opcode, args: &[&str]) -> Result<String, CodegenError> {
        let first = args.first().copied().unwrap_or_default();

        let text = match opcode {
            Opcode::LoadConst => stack::load_const(first),
            Opcode::LoadGlobal => namespace::load_global(name_arg(opcode, first)?),
            Opcode::StoreGlobal => namespace::store_global(name_arg(opcode, first)?),
            Opcode::DeleteGlobal => namespace::delete_global(name_arg(opcode, first)?),
            Opcode::LoadFast => namespace::load_fast(name_arg(opcode, first)?),
            Opcode::StoreFast => namespace::store_fast(name_arg(opcode, first)?),
            Opcode::DeleteFast => namespace::delete_fast(name_arg(opcode, first)?),
            Opcode::MakeContext => namespace::MAKE_CONTEXT.to_string(),
            Opcode::PopContext => namespace::POP_CONTEXT.to_string(),

            Opcode::BinaryAdd => arith::BINARY_ADD.to_string(),
            Opcode::BinarySubtract => arith::BINARY_SUBTRACT.to_string(),
            Opcode::BinaryMultiply => arith::BINARY_MULTIPLY.to_string(),
            Opcode::UnaryNegative => arith::UNARY_NEGATIVE.to_string(),
            Opcode::IsPositive => arith::IS_POSITIVE.to_string(),
            Opcode::IsOdd => arith::IS_ODD.to_string(),
            Opcode::DivideByTwo => arith::DIVIDE_BY_TWO.to_string(),
            Opcode::DivideByTen => arith::DIVIDE_BY_TEN.to_string(),

            Opcode::UnaryNot => control::UNARY_NOT.to_string(),
            Opcode::BinaryAnd => control::BINARY_AND.to_string(),
            Opcode::BinaryOr => control::BINARY_OR.to_string(),
            Opcode::CompareOp => control::compare_op(first)?,
            Opcode::Jump => control::jump(name_arg(opcode, first)?),
            Opcode::PopJumpIfTrue => control::pop_jump_if_true(name_arg(opcode, first)?),
            Opcode::PopJumpIfFalse => control::pop_jump_if_false(name_arg(opcode, first)?),
            Opcode::JumpIfTrueOrPop => control::jump_if_true_or_pop(name_arg(opcode, first)?),
            Opcode::JumpIfFalseOrPop => control::jump_if_false_or_pop(name_arg(opcode, first)?),

            Opcode::Function => {
                let params = args.get(1..).unwrap_or_default();
                for param in params {
                    name_arg(opcode, param)?;
                }
                control::function(name_arg(opcode, first)?, params)
            }
            Opcode::CallFunction => self.call(args)?,
            Opcode::ReturnValue => control::RETURN_VALUE.to_string(),
            Opcode::PrintItem => control::PRINT_ITEM.to_string(),

            Opcode::RotTwo => stack::ROT_TWO.to_string(),
            Opcode::RotThree => stack::ROT_THREE.to_string(),
            Opcode::DupTop => stack::DUP_TOP.to_string(),
            Opcode::PopTop => stack::POP_TOP.to_string(),

            Opcode::Trace => self.trace(args),
            Opcode::UnaryPositive
            | Opcode::PrintNewline
            | Opcode::MakeFunction
            | Opcode::SetupLoop
            | Opcode::PopBlock => String::new(),
        };
        Ok(text)
    }

    fn call(&mut self, args: &[&str]) -> Result<String, CodegenError> {
        let (argc, callee) = match args.split_last() {
            Some((argc, rest)) => (*argc, rest.first().copied()),
            None => ("", None),
        };
        let argc: usize = argc.parse().map_err(|_| CodegenError::InvalidArgument {
            name: Opcode::CallFunction.name().to_string(),
            arg: argc.to_string(),
        })?;
        if argc > MAX_CALL_ARGS {
            return Err(CodegenError::UnsupportedArity { argc });
        }

        let ret = self.return_labels.fresh();
        self.returns.insert(&ret);

        let body = match callee {
            Some(callee) => {
                let callee = name_arg(Opcode::CallFunction, callee)?;
                control::call_static(callee, argc, &ret, self.functions.contains(callee))
            }
            None => control::call_dynamic(argc, &ret, self.functions.iter()),
        };
        Ok(body)
    }

    /// Register dump when tracing is enabled, nothing otherwise.
    fn trace(&self, args: &[&str]) -> String {
        if !self.config.trace {
            return String::new();
        }
        let message = match args.join(" ") {
            msg if msg.is_empty() => "TRACE".to_string(),
            msg => msg,
        };
        format!("i {message}\np\nx\np\nx\n")
    }
}

fn name_arg<'a>(opcode: Opcode, arg: &'a str) -> Result<&'a str, CodegenError> {
    if is_identifier(arg) {
        Ok(arg)
    } else {
        Err(CodegenError::InvalidArgument {
            name: opcode.name().to_string(),
            arg: arg.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn expander() -> Expander {
        Expander::new(Config::default())
    }

    fn declared_labels(script: &str) -> Vec<&str> {
        script.lines().filter_map(|line| line.strip_prefix(':')).collect()
    }

    #[test]
    fn plain_lines_are_trimmed_and_comments_dropped() {
        let out = expander().expand("  g\n# comment\n\n   s/\\d/x/  \n").unwrap();
        assert_eq!(out, "g\ns/[0-9]/x/\n");
    }

    #[test]
    fn single_letter_commands_are_not_macros() {
        let out = expander().expand("G\nH\nx").unwrap();
        assert_eq!(out, "G\nH\nx\n");
    }

    #[test]
    fn push_expands_to_register_moves() {
        let out = expander().expand("PUSH").unwrap();
        insta::assert_snapshot!(out.trim_end(), @r###"
        G
        s/\n/;/
        h
        s/;.*//
        "###);
    }

    #[test]
    fn nested_macros_are_fully_expanded() {
        let out = expander().expand("STORE_GLOBAL x").unwrap();
        insta::assert_snapshot!(out.trim_end(), @r###"
        g
        s/(@(;[^;]+;[^;]*)*);x;[^;]*/\1/
        h
        g
        s/^([^;]*);(.*)$/\2;x;\1/
        h
        "###);
    }

    #[test]
    fn repeated_expansion_never_reuses_local_labels() {
        let mut exp = expander();
        let first = exp.expand("UADD\nUSUB").unwrap();
        let second = exp.expand("UADD\nBINARY_MULTIPLY").unwrap();
        let combined = format!("{first}{second}");

        let labels = declared_labels(&combined);
        let unique: HashSet<_> = labels.iter().collect();
        assert_eq!(labels.len(), unique.len());
        assert!(labels.iter().all(|l| l.starts_with("lbl")));
        assert!(!combined.contains(":."));
        assert_eq!(exp.local_labels_issued(), labels.len());
    }

    #[test]
    fn expansion_is_idempotent() {
        let mut exp = expander();
        let once = exp.expand("BINARY_SUBTRACT\nCOMPARE_OP <=\nIS_ODD").unwrap();
        let twice = exp.expand(&once).unwrap();
        assert_eq!(once, twice);
        assert!(!once.contains(r"\d"));
    }

    #[test]
    fn unknown_macro_aborts() {
        let err = expander().expand("g\nFROBNICATE 1").unwrap_err();
        assert!(matches!(err, CodegenError::UnknownMacro(ref name) if name == "FROBNICATE"));
    }

    #[test]
    fn arity_mismatch_aborts() {
        let err = expander().expand("LOAD_GLOBAL").unwrap_err();
        assert!(matches!(err, CodegenError::Arity { found: 0, .. }));
        let err = expander().expand("PUSH extra").unwrap_err();
        assert!(matches!(err, CodegenError::Arity { found: 1, .. }));
    }

    #[test]
    fn names_must_be_identifiers() {
        let err = expander().expand("STORE_FAST a;b").unwrap_err();
        assert!(matches!(err, CodegenError::InvalidArgument { .. }));
    }

    #[test]
    fn call_arity_is_bounded() {
        let mut exp = expander();
        assert!(exp.expand("CALL_FUNCTION 255").is_ok());
        let err = exp.expand("CALL_FUNCTION 256").unwrap_err();
        assert!(matches!(err, CodegenError::UnsupportedArity { argc: 256 }));
    }

    #[test]
    fn every_call_site_gets_a_return_label() {
        let mut exp = expander();
        exp.register_function("f");
        let out = exp.expand("CALL_FUNCTION 1\nCALL_FUNCTION f 0").unwrap();
        assert_eq!(exp.returns().iter().collect::<Vec<_>>(), ["ret0", "ret1"]);
        assert!(out.contains("t f\n"));
        assert!(out.contains("b f\n:ret1\n"));

        let epilogue = exp.return_dispatch().unwrap();
        assert!(epilogue.contains("t ret0\n"));
        assert!(epilogue.contains("t ret1\n"));
        assert!(epilogue.contains("t end_of_script\n"));
    }

    #[test]
    fn trace_follows_config() {
        assert_eq!(expander().invoke(Macro::Op(Opcode::Trace), &["here"]).unwrap(), "");
        let mut tracing = Expander::new(Config { trace: true });
        let out = tracing.invoke(Macro::Op(Opcode::Trace), &["here"]).unwrap();
        assert_eq!(out, "i here\np\nx\np\nx\n");
    }

    #[test]
    fn placeholders_expand_to_nothing() {
        let out = expander()
            .expand("UNARY_POSITIVE\nSETUP_LOOP\nPOP_BLOCK\nMAKE_FUNCTION\nPRINT_NEWLINE")
            .unwrap();
        assert_eq!(out, "");
    }
}
