use asn1::{SchemaBuilder, SchemaError, Type, Value, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.1.13

CRLDistributionPoints ::= SEQUENCE SIZE (1..MAX) OF DistributionPoint

DistributionPoint ::= SEQUENCE {
     distributionPoint       [0]     DistributionPointName OPTIONAL,
     reasons                 [1]     ReasonFlags OPTIONAL,
     cRLIssuer               [2]     GeneralNames OPTIONAL }

DistributionPointName ::= CHOICE {
     fullName                [0]     GeneralNames,
     nameRelativeToCRLIssuer [1]     RelativeDistinguishedName }

ReasonFlags ::= BIT STRING

FreshestCRL ::= CRLDistributionPoints
 */

pub(super) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let points = b.declare("CRLDistributionPoints");
    let point = b.declare("DistributionPoint");
    let point_name = b.declare("DistributionPointName");
    let reason_flags = b.declare("ReasonFlags");
    let general_names = b.declare("GeneralNames");
    let rdn = b.declare("RelativeDistinguishedName");

    b.define("CRLDistributionPoints", Type::sequence_of(Type::reference(point)))?;
    b.define(
        "DistributionPoint",
        Type::sequence([
            field("distributionPoint", Type::reference(point_name).explicit(0)).optional(),
            field("reasons", Type::reference(reason_flags).implicit(1)).optional(),
            field("cRLIssuer", Type::reference(general_names).implicit(2)).optional(),
        ]),
    )?;
    b.define(
        "DistributionPointName",
        Type::choice([
            ("fullName", Type::reference(general_names).implicit(0)),
            ("nameRelativeToCRLIssuer", Type::reference(rdn).implicit(1)),
        ]),
    )?;
    b.define("ReasonFlags", Type::bit_string())?;
    b.define("FreshestCRL", Type::reference(points))?;

    /*
    https://datatracker.ietf.org/doc/html/rfc5280#section-5.2.5

    IssuingDistributionPoint ::= SEQUENCE {
         distributionPoint          [0] DistributionPointName OPTIONAL,
         onlyContainsUserCerts      [1] BOOLEAN DEFAULT FALSE,
         onlyContainsCACerts        [2] BOOLEAN DEFAULT FALSE,
         onlySomeReasons            [3] ReasonFlags OPTIONAL,
         indirectCRL                [4] BOOLEAN DEFAULT FALSE,
         onlyContainsAttributeCerts [5] BOOLEAN DEFAULT FALSE }
     */
    let no = || Value::Boolean(false);
    b.define(
        "IssuingDistributionPoint",
        Type::sequence([
            field("distributionPoint", Type::reference(point_name).explicit(0)).optional(),
            field("onlyContainsUserCerts", Type::boolean().implicit(1)).default(no()),
            field("onlyContainsCACerts", Type::boolean().implicit(2)).default(no()),
            field("onlySomeReasons", Type::reference(reason_flags).implicit(3)).optional(),
            field("indirectCRL", Type::boolean().implicit(4)).default(no()),
            field("onlyContainsAttributeCerts", Type::boolean().implicit(5)).default(no()),
        ]),
    )?;
    Ok(())
}
