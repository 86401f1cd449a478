//! Type representation for the injekt solver.
//!
//! Types are represented as lightweight `TypeId` handles that point into the
//! interning table. Classifiers (classes, interfaces, type parameters, tags)
//! live in an arena indexed by `ClassifierId`.
//!
//! Equality of `TypeId` is structural: the interner deduplicates identical
//! `TypeData`, so two handles are equal iff their classifier, arguments,
//! nullability, provide flag, star flag, unique id, variance and provenance
//! agree.

use bitflags::bitflags;
use injekt_common::Atom;
use smallvec::SmallVec;

/// A lightweight handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// `kotlin.Any`
    pub const ANY: TypeId = TypeId(0);
    /// `kotlin.Any?`, the universal top type.
    pub const NULLABLE_ANY: TypeId = TypeId(1);
    /// `kotlin.Nothing`
    pub const NOTHING: TypeId = TypeId(2);
    /// `kotlin.Nothing?`
    pub const NULLABLE_NOTHING: TypeId = TypeId(3);
    /// The star projection `*`.
    pub const STAR: TypeId = TypeId(4);

    /// Number of types interned before any host type.
    pub const FIRST_USER: u32 = 5;
}

/// A handle to a classifier in the interner's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassifierId(pub u32);

impl ClassifierId {
    pub const ANY: ClassifierId = ClassifierId(0);
    pub const NOTHING: ClassifierId = ClassifierId(1);
    pub const STAR: ClassifierId = ClassifierId(2);
}

/// Declaration-site or use-site variance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    #[default]
    Invariant,
    In,
    Out,
}

impl Variance {
    /// First non-invariant variance wins: declared, then use-site, then the
    /// variance of the original declaration.
    pub fn effective(declared: Variance, use_site: Variance, original: Variance) -> Variance {
        if declared != Variance::Invariant {
            return declared;
        }
        if use_site != Variance::Invariant {
            return use_site;
        }
        original
    }

    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in ",
            Variance::Out => "out ",
        }
    }
}

/// The calling convention a value must be invoked in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CallContext {
    #[default]
    Default,
    Composable,
    Suspend,
}

impl CallContext {
    /// A context can call candidates of the same context and ordinary ones.
    pub fn can_call(self, other: CallContext) -> bool {
        self == other || other == CallContext::Default
    }

    pub fn name(self) -> &'static str {
        match self {
            CallContext::Default => "default",
            CallContext::Composable => "composable",
            CallContext::Suspend => "suspend",
        }
    }
}

bitflags! {
    /// Classifier kind flags.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ClassifierFlags: u16 {
        const TYPE_PARAMETER = 1 << 0;
        const OBJECT = 1 << 1;
        const TAG = 1 << 2;
        /// Type parameter of an add-on injectable.
        const ADD_ON = 1 << 3;
        /// Type parameter that must receive a reified argument.
        const REIFIED = 1 << 4;
        /// One of the function classifiers (`Function{n}` and friends).
        const FUNCTION = 1 << 5;
        /// Provider aggregate whose members are harvested as candidates.
        const MODULE = 1 << 6;
    }
}

/// Arena entry for a classifier.
///
/// Classifiers are identified by `key`. Copies produced by classifier-list
/// substitution get their own arena slot (with substituted supertypes) but
/// share the key and point back at the declaration through `origin`.
#[derive(Clone, Debug)]
pub struct ClassifierData {
    pub key: Atom,
    pub fq_name: Atom,
    pub type_parameters: Vec<ClassifierId>,
    pub flags: ClassifierFlags,
    pub variance: Variance,
    pub tags: Vec<TypeId>,
    pub call_context: CallContext,
    pub origin: ClassifierId,
}

impl ClassifierData {
    #[inline]
    pub fn is_type_parameter(&self) -> bool {
        self.flags.contains(ClassifierFlags::TYPE_PARAMETER)
    }

    #[inline]
    pub fn is_tag(&self) -> bool {
        self.flags.contains(ClassifierFlags::TAG)
    }
}

/// Host-facing description of a classifier to declare.
#[derive(Clone, Debug, Default)]
pub struct ClassifierDecl {
    pub fq_name: String,
    /// Identity key. Defaults to `fq_name` when empty.
    pub key: String,
    pub type_parameters: Vec<ClassifierId>,
    pub flags: ClassifierFlags,
    pub variance: Variance,
    pub tags: Vec<TypeId>,
    pub call_context: CallContext,
}

impl ClassifierDecl {
    pub fn new(fq_name: impl Into<String>) -> Self {
        ClassifierDecl {
            fq_name: fq_name.into(),
            ..Default::default()
        }
    }

    pub fn type_parameter(fq_name: impl Into<String>, variance: Variance) -> Self {
        ClassifierDecl {
            fq_name: fq_name.into(),
            flags: ClassifierFlags::TYPE_PARAMETER,
            variance,
            ..Default::default()
        }
    }

    pub fn with_type_parameters(mut self, type_parameters: Vec<ClassifierId>) -> Self {
        self.type_parameters = type_parameters;
        self
    }

    pub fn with_flags(mut self, flags: ClassifierFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_tags(mut self, tags: Vec<TypeId>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }
}

pub type TypeArgs = SmallVec<[TypeId; 4]>;

/// The interned structure behind a `TypeId`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeData {
    pub classifier: ClassifierId,
    pub arguments: TypeArgs,
    pub nullable: bool,
    pub provide: bool,
    pub star: bool,
    /// Distinguishes structurally identical instantiations produced during
    /// module expansion.
    pub unique_id: Option<u32>,
    pub variance: Variance,
    /// Type variable this type was derived from during constraint propagation.
    pub source: Option<ClassifierId>,
}

impl TypeData {
    pub fn new(classifier: ClassifierId, arguments: impl IntoIterator<Item = TypeId>) -> Self {
        TypeData {
            classifier,
            arguments: arguments.into_iter().collect(),
            nullable: false,
            provide: false,
            star: false,
            unique_id: None,
            variance: Variance::Invariant,
            source: None,
        }
    }
}

/// The classifiers every session needs.
#[derive(Copy, Clone, Debug)]
pub struct Builtins {
    pub any: ClassifierId,
    pub nothing: ClassifierId,
    pub star: ClassifierId,
    pub collection: ClassifierId,
    pub list: ClassifierId,
    pub source_key: ClassifierId,
    pub type_key: ClassifierId,
}
