use asn1::{NamedValues, SchemaBuilder, SchemaError, Type};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-5.2

CRLNumber ::= INTEGER (0..MAX)

BaseCRLNumber ::= CRLNumber

CRLReason ::= ENUMERATED {
     unspecified             (0),
     keyCompromise           (1),
     cACompromise            (2),
     affiliationChanged      (3),
     superseded              (4),
     cessationOfOperation    (5),
     certificateHold         (6),
          -- value 7 is not used
     removeFromCRL           (8),
     privilegeWithdrawn      (9),
     aACompromise           (10) }

InvalidityDate ::=  GeneralizedTime

CertificateIssuer ::=     GeneralNames
 */

pub(super) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let crl_number = b.declare("CRLNumber");
    let general_names = b.declare("GeneralNames");

    b.define("CRLNumber", Type::integer())?;
    b.define("BaseCRLNumber", Type::reference(crl_number))?;
    b.define(
        "CRLReason",
        Type::enumerated(NamedValues::new([
            (0, "unspecified"),
            (1, "keyCompromise"),
            (2, "cACompromise"),
            (3, "affiliationChanged"),
            (4, "superseded"),
            (5, "cessationOfOperation"),
            (6, "certificateHold"),
            (8, "removeFromCRL"),
            (9, "privilegeWithdrawn"),
            (10, "aACompromise"),
        ])),
    )?;
    b.define("InvalidityDate", Type::generalized_time())?;
    b.define("CertificateIssuer", Type::reference(general_names))?;
    Ok(())
}
