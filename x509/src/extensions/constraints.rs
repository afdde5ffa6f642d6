use asn1::{SchemaBuilder, SchemaError, Type, Value, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.9

BasicConstraints ::= SEQUENCE {
     cA                      BOOLEAN DEFAULT FALSE,
     pathLenConstraint       INTEGER (0..MAX) OPTIONAL }

NameConstraints ::= SEQUENCE {
     permittedSubtrees       [0]     GeneralSubtrees OPTIONAL,
     excludedSubtrees        [1]     GeneralSubtrees OPTIONAL }

GeneralSubtrees ::= SEQUENCE SIZE (1..MAX) OF GeneralSubtree

GeneralSubtree ::= SEQUENCE {
     base                    GeneralName,
     minimum         [0]     BaseDistance DEFAULT 0,
     maximum         [1]     BaseDistance OPTIONAL }

BaseDistance ::= INTEGER (0..MAX)
 */

pub(super) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let subtrees = b.declare("GeneralSubtrees");
    let subtree = b.declare("GeneralSubtree");
    let general_name = b.declare("GeneralName");
    let base_distance = b.declare("BaseDistance");

    b.define(
        "BasicConstraints",
        Type::sequence([
            field("cA", Type::boolean()).default(Value::Boolean(false)),
            field("pathLenConstraint", Type::integer()).optional(),
        ]),
    )?;
    b.define(
        "NameConstraints",
        Type::sequence([
            field("permittedSubtrees", Type::reference(subtrees).implicit(0)).optional(),
            field("excludedSubtrees", Type::reference(subtrees).implicit(1)).optional(),
        ]),
    )?;
    b.define("GeneralSubtrees", Type::sequence_of(Type::reference(subtree)))?;
    b.define(
        "GeneralSubtree",
        Type::sequence([
            field("base", Type::reference(general_name)),
            field("minimum", Type::reference(base_distance).implicit(0)).default(Value::integer(0)),
            field("maximum", Type::reference(base_distance).implicit(1)).optional(),
        ]),
    )?;
    b.define("BaseDistance", Type::integer())?;
    Ok(())
}
