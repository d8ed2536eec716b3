#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    // Names
    VariableNotFound(String),
    FunctionNotFound(String),
    GlobalVariableNotFound(String),
    GlobalStatementInTopLevel,

    // Calls
    ArgumentTooMany {
        name: String,
        expected: usize,
        actual: usize,
    },
    ArgumentTooFew {
        name: String,
        expected: usize,
        actual: usize,
    },
    StackOverflow(usize),
    NoSuchMethod(String),

    // Operators
    NotBooleanType,
    NotBooleanForNot,
    MinusOperandType,
    BadOperandType(String),
    NotBooleanOperator(String),
    NotNullOperator(String),
    BadOperatorForString(String),
    DivisionByZero,
    IncDecOperandType,
    NotLvalue,

    // Arrays and records
    IndexOperandNotArray,
    IndexOperandNotInt,
    ArrayIndexOutOfBound {
        size: usize,
        index: i64,
    },
    ArrayResizeArgument,
    NewArrayArgumentType,
    MemberOperationNotAssoc,
    NoSuchMember(String),

    // Exceptions and iteration
    ThrowNotExceptionType,
    ForeachNotArrayType,
    UncaughtException {
        message: String,
        trace: String,
    },

    // Natives
    FopenArgumentType,
    FcloseArgumentType,
    FgetsArgumentType,
    FputsArgumentType,
    NativeArgumentType {
        name: &'static str,
        expected: &'static str,
    },
}

pub struct DiagnosticsFormatter;

impl DiagnosticsFormatter {
    fn format_en(kind: &DiagnosticKind) -> String {
        match kind {
            DiagnosticKind::VariableNotFound(name) => format!("Variable not found: {}", name),
            DiagnosticKind::FunctionNotFound(name) => format!("Function not found: {}", name),
            DiagnosticKind::GlobalVariableNotFound(name) => {
                format!("Global variable {} does not exist", name)
            }
            DiagnosticKind::GlobalStatementInTopLevel => {
                "Global statement is not allowed outside a function".into()
            }

            DiagnosticKind::ArgumentTooMany {
                name,
                expected,
                actual,
            } => format!(
                "Too many arguments for {}: expected {} but got {}",
                name, expected, actual
            ),
            DiagnosticKind::ArgumentTooFew {
                name,
                expected,
                actual,
            } => format!(
                "Too few arguments for {}: expected {} but got {}",
                name, expected, actual
            ),
            DiagnosticKind::StackOverflow(depth) => {
                format!("Call depth limit exceeded ({})", depth)
            }
            DiagnosticKind::NoSuchMethod(name) => format!("No such method: {}", name),

            DiagnosticKind::NotBooleanType => "Condition must be of type boolean".into(),
            DiagnosticKind::NotBooleanForNot => "Operator ! expects a boolean operand".into(),
            DiagnosticKind::MinusOperandType => "Unary minus expects an int or double".into(),
            DiagnosticKind::BadOperandType(op) => {
                format!("Unexpected operand types for operator {}", op)
            }
            DiagnosticKind::NotBooleanOperator(op) => {
                format!("Operator {} cannot be applied to booleans", op)
            }
            DiagnosticKind::NotNullOperator(op) => {
                format!("Null can only be used with == and != (not {})", op)
            }
            DiagnosticKind::BadOperatorForString(op) => {
                format!("Operator {} cannot be applied to strings", op)
            }
            DiagnosticKind::DivisionByZero => "Division by zero".into(),
            DiagnosticKind::IncDecOperandType => {
                "Increment/decrement operand must be an int lvalue".into()
            }
            DiagnosticKind::NotLvalue => "Invalid assignment target".into(),

            DiagnosticKind::IndexOperandNotArray => {
                "Left side of index operation is not an array".into()
            }
            DiagnosticKind::IndexOperandNotInt => "Array index must be an int".into(),
            DiagnosticKind::ArrayIndexOutOfBound { size, index } => format!(
                "Array index out of bounds: size is {}, index is [{}]",
                size, index
            ),
            DiagnosticKind::ArrayResizeArgument => {
                "Array resize expects a non-negative int".into()
            }
            DiagnosticKind::NewArrayArgumentType => {
                "new_array() dimensions must be non-negative ints".into()
            }
            DiagnosticKind::MemberOperationNotAssoc => {
                "Member access requires an object".into()
            }
            DiagnosticKind::NoSuchMember(name) => format!("No such member: {}", name),

            DiagnosticKind::ThrowNotExceptionType => {
                "Only exception objects can be thrown".into()
            }
            DiagnosticKind::ForeachNotArrayType => "foreach requires an array".into(),
            DiagnosticKind::UncaughtException { message, trace } => {
                if trace.is_empty() {
                    format!("Uncaught exception: {}", message)
                } else {
                    format!("Uncaught exception: {}\n{}", message, trace.trim_end())
                }
            }

            DiagnosticKind::FopenArgumentType => {
                "fopen() expects a file name and an open mode string".into()
            }
            DiagnosticKind::FcloseArgumentType => "fclose() expects a file pointer".into(),
            DiagnosticKind::FgetsArgumentType => "fgets() expects a file pointer".into(),
            DiagnosticKind::FputsArgumentType => {
                "fputs() expects a string and a file pointer".into()
            }
            DiagnosticKind::NativeArgumentType { name, expected } => {
                format!("{}() expects {}", name, expected)
            }
        }
    }

    pub fn format(kind: &DiagnosticKind) -> String {
        Self::format_en(kind)
    }
}
