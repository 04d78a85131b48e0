//! Fixity declarations collected into a lookup table, with the Haskell
//! Report's default (`infixl 9`) for any operator never declared (§4.3/§9).

use rustc_hash::FxHashMap;

use hsc_parser::ast::item::{Associativity, Decl, FixityDecl};
use hsc_parser::ast::item::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixity {
    pub assoc: Associativity,
    pub precedence: u8,
}

impl Fixity {
    pub const DEFAULT: Fixity = Fixity {
        assoc: Associativity::Left,
        precedence: 9,
    };
}

impl Default for Fixity {
    fn default() -> Self {
        Fixity::DEFAULT
    }
}

/// Maps operator spelling (`"+"`, `":+:"`, ...) to its declared fixity.
#[derive(Debug, Clone, Default)]
pub struct FixityTable {
    table: FxHashMap<String, Fixity>,
}

impl FixityTable {
    pub fn collect<'a>(decls: impl Iterator<Item = &'a Decl>) -> Self {
        let mut table = FxHashMap::default();
        for decl in decls {
            if let Decl::Fixity(fx) = decl {
                insert_fixity_decl(&mut table, fx);
            }
        }
        Self { table }
    }

    pub fn from_source_file(file: &SourceFile) -> Self {
        let decls: Vec<Decl> = file.decls().collect();
        Self::collect(decls.iter())
    }

    pub fn lookup(&self, op: &str) -> Fixity {
        self.table.get(op).copied().unwrap_or_default()
    }
}

fn insert_fixity_decl(table: &mut FxHashMap<String, Fixity>, fx: &FixityDecl) {
    let fixity = Fixity {
        assoc: fx.associativity(),
        // A fixity decl with no explicit precedence defaults to 9, same as
        // an undeclared operator (Haskell 2010 report, section 4.4.2).
        precedence: fx.precedence().unwrap_or(9),
    };
    for op in fx.operators() {
        table.insert(op, fixity);
    }
}
