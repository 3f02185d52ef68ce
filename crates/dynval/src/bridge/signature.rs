//! Native function signatures and their textual declarations

use std::fmt;

use quote::ToTokens;

use crate::error::DeclarationError;
use crate::value::DataType;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name, without any sigil
    pub name: String,

    /// Declared type
    pub ty: DataType,

    /// Whether the caller's slot is passed by reference
    pub by_ref: bool,
}

impl Param {
    /// A by-value parameter.
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
            by_ref: false,
        }
    }

    /// A by-reference parameter.
    pub fn by_ref(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
            by_ref: true,
        }
    }
}

/// Name, parameters and return type of a native function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Function name
    pub name: String,

    /// Parameters in call order
    pub params: Vec<Param>,

    /// Declared return type
    pub ret: DataType,
}

impl Signature {
    /// Build a signature from parts.
    ///
    /// # Errors
    ///
    /// Returns `VoidParameter` if any parameter is declared `void`.
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        ret: DataType,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();
        if let Some(param) = params.iter().find(|p| p.ty == DataType::Void) {
            return Err(DeclarationError::VoidParameter {
                function: name,
                param: param.name.clone(),
            });
        }
        Ok(Self { name, params, ret })
    }

    /// Parse a declaration such as
    /// `fn str_pad(input: string, len: int, pad: &mut mixed) -> string`.
    ///
    /// A trailing `;` is allowed. Omitting the return type declares `void`.
    ///
    /// # Errors
    ///
    /// - `Syntax` if the text is not a Rust function signature
    /// - `InvalidParameter` for `self` receivers, generics, variadics and
    ///   patterns other than a plain name
    /// - `UnknownType` for types outside the bridge's type set
    /// - `VoidParameter` for a parameter declared `void`
    pub fn parse(decl: &str) -> Result<Self, DeclarationError> {
        let decl = decl.trim().trim_end_matches(';');
        let sig: syn::Signature = syn::parse_str(decl)?;
        let name = sig.ident.to_string();

        if !sig.generics.params.is_empty() {
            return Err(DeclarationError::InvalidParameter {
                function: name,
                param: sig.generics.to_token_stream().to_string(),
            });
        }
        if let Some(variadic) = &sig.variadic {
            return Err(DeclarationError::InvalidParameter {
                function: name,
                param: variadic.to_token_stream().to_string(),
            });
        }

        let params = sig
            .inputs
            .iter()
            .map(|input| parse_param(&name, input))
            .collect::<Result<Vec<_>, _>>()?;

        let ret = match &sig.output {
            syn::ReturnType::Default => DataType::Void,
            syn::ReturnType::Type(_, ty) => parse_type(&name, ty)?,
        };

        Self::new(name, params, ret)
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

fn parse_param(function: &str, input: &syn::FnArg) -> Result<Param, DeclarationError> {
    let invalid = || DeclarationError::InvalidParameter {
        function: function.to_string(),
        param: input.to_token_stream().to_string(),
    };

    let pat_type = match input {
        syn::FnArg::Typed(pat_type) => pat_type,
        syn::FnArg::Receiver(_) => return Err(invalid()),
    };

    let name = match &*pat_type.pat {
        syn::Pat::Ident(pat_ident)
            if pat_ident.by_ref.is_none()
                && pat_ident.mutability.is_none()
                && pat_ident.subpat.is_none() =>
        {
            pat_ident.ident.to_string()
        }
        _ => return Err(invalid()),
    };

    let param = match &*pat_type.ty {
        syn::Type::Reference(reference) if reference.mutability.is_some() => {
            Param::by_ref(name, parse_type(function, &reference.elem)?)
        }
        ty => Param::new(name, parse_type(function, ty)?),
    };

    if param.ty == DataType::Void {
        return Err(DeclarationError::VoidParameter {
            function: function.to_string(),
            param: param.name,
        });
    }
    Ok(param)
}

fn parse_type(function: &str, ty: &syn::Type) -> Result<DataType, DeclarationError> {
    let unknown = || DeclarationError::UnknownType {
        function: function.to_string(),
        ty: ty.to_token_stream().to_string(),
    };

    match ty {
        syn::Type::Tuple(tuple) if tuple.elems.is_empty() => Ok(DataType::Void),
        syn::Type::Paren(paren) => parse_type(function, &paren.elem),
        syn::Type::Path(path) if path.qself.is_none() => {
            let ident = path.path.get_ident().ok_or_else(unknown)?;
            match ident.to_string().as_str() {
                "void" => Ok(DataType::Void),
                "bool" => Ok(DataType::Bool),
                "int" | "i64" => Ok(DataType::Int),
                "float" | "f64" => Ok(DataType::Float),
                "string" => Ok(DataType::String),
                "array" => Ok(DataType::Array),
                "resource" => Ok(DataType::Resource),
                "object" => Ok(DataType::Object),
                "mixed" => Ok(DataType::Mixed),
                _ => Err(unknown()),
            }
        }
        _ => Err(unknown()),
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.by_ref {
            write!(f, "{}: &mut {}", self.name, self.ty)
        } else {
            write!(f, "{}: {}", self.name, self.ty)
        }
    }
}

/// Renders the declaration form accepted by [`Signature::parse`].
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ")")?;
        if self.ret != DataType::Void {
            write!(f, " -> {}", self.ret)?;
        }
        Ok(())
    }
}
