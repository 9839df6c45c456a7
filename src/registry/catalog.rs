use super::{FunctionCategory, FunctionRegistry, FunctionSchema};

/// Declares the built-in catalog as one table, grouped by category.
macro_rules! define_functions {
    ( $( $category:ident { $( $name:literal ( $( $param:literal ),* ) ),* $(,)? } )* ) => {
        pub(super) fn register_default_functions(registry: &mut FunctionRegistry) {
            $( $(
                registry.register(FunctionSchema::new(
                    $name,
                    FunctionCategory::$category,
                    &[$( $param ),*],
                ));
            )* )*
        }
    };
}

define_functions! {
    Timing {
        "RoundStart"(),
        "RoundEnd"(),
        "BattleStart"(),
        "BattleEnd"(),
        "TurnStart"(),
        "TurnEnd"(),
        "OnUseCard"("cardId"),
        "OnDamaged"("source"),
        "OnKill"("target"),
    }

    ValueAcquisition {
        "getdata"("target", "id"),
        "gethp"("target"),
        "getbuf"("target", "keyword"),
        "getcount"("target", "kind"),
        "random"("min", "max"),
        "calc"("left", "operator", "right"),
    }

    Consequence {
        "buf"("target", "keyword", "stack", "turn", "delay"),
        "damage"("target", "amount"),
        "heal"("target", "amount"),
        "setdata"("target", "id", "value"),
        "draw"("target", "count"),
        "addlight"("target", "amount"),
    }

    // Structural keywords; graph nodes of these kinds are not registry-backed.
    Conditional {
        "IF"("condition"),
    }

    ContinueIf {
        "CONTINUEIF"("condition"),
    }
}
